use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{generate_id, Category, Id};

/// Top-level grouping of categories and products (a product line)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id", alias = "id")]
    pub id: Id,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    #[serde(default)]
    pub categories: Vec<Id>,
    #[serde(default)]
    pub products: Vec<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(title: String, description: Option<String>, image: String) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title,
            description,
            image,
            categories: Vec::new(),
            products: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input model for creating a collection, optionally with inline category titles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Collection with its category references replaced by the category records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedCollection {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    pub categories: Vec<Category>,
    pub products: Vec<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpandedCollection {
    /// Populate categories in the collection's list order. Ids missing from `categories` are skipped.
    pub fn populate(collection: Collection, categories: &HashMap<Id, Category>) -> Self {
        let expanded = collection
            .categories
            .iter()
            .filter_map(|id| categories.get(id).cloned())
            .collect();

        Self {
            id: collection.id,
            title: collection.title,
            description: collection.description,
            image: collection.image,
            categories: expanded,
            products: collection.products,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_json_shape() {
        let collection = Collection::new("Summer".to_string(), None, "http://x/y.png".to_string());
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["_id"], collection.id.as_str());
        assert_eq!(json["title"], "Summer");
        assert!(json.get("description").is_none());
        assert!(json.get("createdAt").is_some());

        let back: Collection = serde_json::from_value(json).unwrap();
        assert_eq!(back, collection);
    }

    #[test]
    fn test_populate_keeps_list_order_and_skips_missing() {
        let mut collection = Collection::new("Summer".to_string(), None, "img".to_string());
        let shirts = Category::new(collection.id.clone(), "Shirts".to_string(), None, None);
        let hats = Category::new(collection.id.clone(), "Hats".to_string(), None, None);
        collection.categories = vec![hats.id.clone(), "gone".to_string(), shirts.id.clone()];

        let lookup: HashMap<Id, Category> = [shirts.clone(), hats.clone()]
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let expanded = ExpandedCollection::populate(collection, &lookup);
        assert_eq!(expanded.categories, vec![hats, shirts]);
    }
}
