//! # campus-core
//!
//! Entity types shared across the campus crates:
//! - `Room` and `Company`: leaf records with no outgoing references
//! - `Course`: references one `Room`, resolved at construction
//! - `Student`: references one `Course` and one `Company`
//!
//! Reference fields hold the resolved record, not a bare id: a cached
//! `Course` or `Student` is valid by construction. Resolution happens in
//! `campus-db` before an entity is built.

pub mod entities;

pub use entities::{Company, Course, Id, Room, Student};
