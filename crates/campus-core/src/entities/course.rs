use serde::{Deserialize, Serialize};

use crate::entities::{Id, Room};

/// A course held in exactly one room.
///
/// The room is resolved when the course is constructed; a course with an
/// unresolvable room reference is never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: Id,
    pub name: String,
    pub room: Room,
}
