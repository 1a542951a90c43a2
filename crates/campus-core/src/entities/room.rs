use serde::{Deserialize, Serialize};

use crate::entities::Id;

/// A training room. Leaf record: references nothing, courses reference it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: Id,
    pub name: String,
}
