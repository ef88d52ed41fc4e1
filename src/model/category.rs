use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Id};

/// Grouping of products inside one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owning collection
    pub collection: Id,
    #[serde(default)]
    pub products: Vec<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        collection: Id,
        title: String,
        description: Option<String>,
        image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title,
            description: description.unwrap_or_default(),
            image,
            collection,
            products: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input model for creating a category under a collection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}
