use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Collection, Id, OneOrMany};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variants {
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_in_stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
}

/// Sellable item. `price` serializes as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Id,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media: Vec<String>,
    pub price: Decimal,
    pub categories: Vec<Id>,
    pub collections: Vec<Id>,
    #[serde(flatten)]
    pub variants: Variants,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        title: String,
        description: String,
        media: Vec<String>,
        price: Decimal,
        categories: Vec<Id>,
        collections: Vec<Id>,
        variants: Variants,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title,
            description,
            media,
            price,
            categories,
            collections,
            variants,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the product references both the collection and the category
    pub fn belongs_to(&self, collection_id: &str, category_id: &str) -> bool {
        self.collections.iter().any(|id| id == collection_id)
            && self.categories.iter().any(|id| id == category_id)
    }
}

/// Input model for creating a product.
///
/// The nested route takes its references from the path and ignores
/// `categories`/`collections`; the flat `/products` route requires them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub media: Option<Vec<String>>,
    /// Number or numeric string, validated before any write
    pub price: Option<serde_json::Value>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub units_in_stock: Option<i64>,
    pub dimensions: Option<String>,
    #[serde(alias = "category")]
    pub categories: Option<OneOrMany<Id>>,
    #[serde(alias = "collection")]
    pub collections: Option<OneOrMany<Id>>,
}

/// Product with its collection references replaced by the collection records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedProduct {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub description: String,
    pub media: Vec<String>,
    pub price: Decimal,
    pub categories: Vec<Id>,
    pub collections: Vec<Collection>,
    #[serde(flatten)]
    pub variants: Variants,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpandedProduct {
    pub fn populate(product: Product, collections: &std::collections::HashMap<Id, Collection>) -> Self {
        let expanded = product
            .collections
            .iter()
            .filter_map(|id| collections.get(id).cloned())
            .collect();

        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            media: product.media,
            price: product.price,
            categories: product.categories,
            collections: expanded,
            variants: product.variants,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_product_round_trips_with_flattened_variants() {
        let product = Product::new(
            "Linen Shirt".to_string(),
            String::new(),
            vec!["http://x/shirt.png".to_string()],
            Decimal::from_str("19.99").unwrap(),
            vec!["cat".to_string()],
            vec!["col".to_string()],
            Variants {
                sizes: vec!["M".to_string()],
                units_in_stock: Some(4),
                ..Variants::default()
            },
        );

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], "19.99");
        assert_eq!(json["unitsInStock"], 4);
        assert_eq!(json["sizes"][0], "M");
        assert!(json.get("dimensions").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_new_product_accepts_singular_reference_keys() {
        let input: NewProduct = serde_json::from_str(
            r#"{"title": "Cap", "price": "5", "category": "c1", "collections": ["a", "b"]}"#,
        )
        .unwrap();

        assert_eq!(input.name.as_deref(), Some("Cap"));
        assert_eq!(input.categories.unwrap().into_vec(), vec!["c1"]);
        assert_eq!(input.collections.unwrap().into_vec(), vec!["a", "b"]);
    }
}
