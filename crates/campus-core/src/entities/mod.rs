//! Entity structs for all campus domain objects.
//!
//! Each entity maps to a table in the libSQL database. Ids are assigned by
//! the store on insert and never reused within a registry.

mod company;
mod course;
mod room;
mod student;

pub use company::Company;
pub use course::Course;
pub use room::Room;
pub use student::Student;

/// Store-assigned row identifier. Opaque to callers; positive once assigned.
pub type Id = i64;
