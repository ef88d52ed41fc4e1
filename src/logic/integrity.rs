use std::collections::HashSet;

use crate::error::Result;
use crate::model::{DanglingReference, Id, IntegrityReport, RecordKind};
use crate::store::traits::Store;

/// Read-only scan for references that no longer resolve
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub async fn check<S: Store>(store: &S) -> Result<IntegrityReport> {
        let collections = store.list_collections().await?;
        let categories = store.list_categories().await?;
        let products = store.list_products().await?;

        let collection_ids: HashSet<&Id> = collections.iter().map(|c| &c.id).collect();
        let category_ids: HashSet<&Id> = categories.iter().map(|c| &c.id).collect();
        let product_ids: HashSet<&Id> = products.iter().map(|p| &p.id).collect();

        let mut dangling = Vec::new();
        let mut scan = |owner_kind: RecordKind, owner_id: &Id, field: &str, ids: &[Id], known: &HashSet<&Id>| {
            for id in ids.iter().filter(|id| !known.contains(id)) {
                dangling.push(DanglingReference {
                    owner_kind,
                    owner_id: owner_id.clone(),
                    field: field.to_string(),
                    missing_id: id.clone(),
                });
            }
        };

        for collection in &collections {
            scan(RecordKind::Collection, &collection.id, "categories", &collection.categories, &category_ids);
            scan(RecordKind::Collection, &collection.id, "products", &collection.products, &product_ids);
        }
        for category in &categories {
            scan(
                RecordKind::Category,
                &category.id,
                "collection",
                std::slice::from_ref(&category.collection),
                &collection_ids,
            );
            scan(RecordKind::Category, &category.id, "products", &category.products, &product_ids);
        }
        for product in &products {
            scan(RecordKind::Product, &product.id, "categories", &product.categories, &category_ids);
            scan(RecordKind::Product, &product.id, "collections", &product.collections, &collection_ids);
        }

        if !dangling.is_empty() {
            log::warn!("Integrity check found {} dangling references", dangling.len());
        }

        Ok(IntegrityReport {
            collections_checked: collections.len(),
            categories_checked: categories.len(),
            products_checked: products.len(),
            dangling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{CategoryOperations, CollectionOperations, ProductOperations};
    use crate::model::{NewCategory, NewCollection, NewProduct, UserContext};
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_collection_delete_leaves_products_dangling() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());

        let collection = CollectionOperations::create(
            &store,
            &user,
            NewCollection {
                title: Some("Summer".to_string()),
                image: Some("img".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let category = CategoryOperations::create(
            &store,
            &user,
            &collection.id,
            NewCategory {
                name: Some("Shirts".to_string()),
                description: None,
                image: Some("img".to_string()),
            },
        )
        .await
        .unwrap();
        let product = ProductOperations::create_in_category(
            &store,
            &user,
            &collection.id,
            &category.id,
            NewProduct {
                name: Some("Tee".to_string()),
                price: Some(json!(12)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(IntegrityChecker::check(&store).await.unwrap().is_clean());

        CollectionOperations::delete(&store, &user, &collection.id).await.unwrap();

        let report = IntegrityChecker::check(&store).await.unwrap();
        assert_eq!(report.collections_checked, 0);
        assert_eq!(report.categories_checked, 0);
        assert_eq!(report.products_checked, 1);

        let fields: Vec<(&str, &str)> = report
            .dangling_from(&product.id)
            .map(|d| (d.field.as_str(), d.missing_id.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("categories", category.id.as_str()),
                ("collections", collection.id.as_str())
            ]
        );
    }
}
