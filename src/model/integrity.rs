use serde::{Deserialize, Serialize};

use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Collection,
    Category,
    Product,
}

/// An id stored on a record that no longer resolves to a record of the expected kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub owner_kind: RecordKind,
    pub owner_id: Id,
    pub field: String,
    pub missing_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub collections_checked: usize,
    pub categories_checked: usize,
    pub products_checked: usize,
    pub dangling: Vec<DanglingReference>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }

    pub fn dangling_from(&self, owner_id: &str) -> impl Iterator<Item = &DanglingReference> {
        let owner_id = owner_id.to_string();
        self.dangling.iter().filter(move |d| d.owner_id == owner_id)
    }
}
