use serde::{Deserialize, Serialize};

use crate::entities::Id;

/// A partner company students are placed with. Leaf record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub id: Id,
    pub name: String,
}
