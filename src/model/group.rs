use serde::{Deserialize, Serialize};

use super::ids::Id;

/// A node in the contact-organization hierarchy. The tree is expressed only
/// through `parent_id`; children and members are derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Id<Group>,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Id<Group>>,
}

impl Group {
    pub fn create(name: String, description: Option<String>, parent_id: Option<Id<Group>>) -> Self {
        Self {
            id: Id::generate(),
            name,
            description,
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
