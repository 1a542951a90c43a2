use serde::{Deserialize, Serialize};

use crate::entities::{Company, Course, Id};

/// A student enrolled in one course and placed with one company.
///
/// Both references are resolved at construction and required. `skill_level`
/// is an integer in 0-100, enforced by the student registry on add/update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: Id,
    pub name: String,
    pub surname: String,
    pub skill_level: i64,
    pub course: Course,
    pub company: Company,
}
