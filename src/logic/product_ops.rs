use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::logic::validate::{optional_text, parse_price, parse_units_in_stock, required_text};
use crate::model::{
    Collection, ExpandedProduct, Id, NewProduct, OneOrMany, Product, UserContext, Variants,
};
use crate::store::traits::Store;

/// Validated product fields, before references are attached
#[derive(Debug)]
struct ProductDraft {
    title: String,
    description: String,
    media: Vec<String>,
    price: Decimal,
    variants: Variants,
    categories: Vec<Id>,
    collections: Vec<Id>,
}

impl ProductDraft {
    /// Check every field of the request. Runs before any read or write.
    fn validate(input: NewProduct) -> Result<Self> {
        let price = parse_price(input.price.as_ref())?;
        let title = required_text("name", input.name)?;
        let units_in_stock = parse_units_in_stock(input.units_in_stock)?;

        Ok(Self {
            title,
            description: optional_text(input.description).unwrap_or_default(),
            media: input
                .media
                .unwrap_or_default()
                .into_iter()
                .filter_map(|m| optional_text(Some(m)))
                .collect(),
            price,
            variants: Variants {
                sizes: input.sizes.unwrap_or_default(),
                colors: input.colors.unwrap_or_default(),
                units_in_stock,
                dimensions: optional_text(input.dimensions),
            },
            categories: reference_list(input.categories),
            collections: reference_list(input.collections),
        })
    }

    fn into_product(self, categories: Vec<Id>, collections: Vec<Id>) -> Product {
        Product::new(
            self.title,
            self.description,
            self.media,
            self.price,
            categories,
            collections,
            self.variants,
        )
    }
}

fn reference_list(ids: Option<OneOrMany<Id>>) -> Vec<Id> {
    ids.map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| optional_text(Some(id)))
        .unique()
        .collect()
}

pub struct ProductOperations;

impl ProductOperations {
    /// Create a product under one collection and one of its categories
    pub async fn create_in_category<S: Store>(
        store: &S,
        user: &UserContext,
        collection_id: &Id,
        category_id: &Id,
        input: NewProduct,
    ) -> Result<Product> {
        let draft = ProductDraft::validate(input)?;

        if store.get_collection(collection_id).await?.is_none() {
            return Err(CatalogError::not_found("Collection not found"));
        }
        store
            .get_category(category_id)
            .await?
            .filter(|c| &c.collection == collection_id)
            .ok_or_else(|| CatalogError::not_found("Category not found"))?;

        let product = draft.into_product(vec![category_id.clone()], vec![collection_id.clone()]);
        Self::insert(store, user, product).await
    }

    /// Create a product from the references listed in the request body
    pub async fn create<S: Store>(store: &S, user: &UserContext, input: NewProduct) -> Result<Product> {
        let mut draft = ProductDraft::validate(input)?;

        if draft.categories.is_empty() {
            return Err(CatalogError::validation("at least one category is required"));
        }
        if draft.collections.is_empty() {
            return Err(CatalogError::validation("at least one collection is required"));
        }

        let categories = std::mem::take(&mut draft.categories);
        let collections = std::mem::take(&mut draft.collections);
        Self::insert(store, user, draft.into_product(categories, collections)).await
    }

    async fn insert<S: Store>(store: &S, user: &UserContext, product: Product) -> Result<Product> {
        store.create_product(product.clone()).await?;

        log::info!(
            "{} created product '{}' ({}) at {} in {} categories",
            user.user_id,
            product.title,
            product.id,
            product.price,
            product.categories.len()
        );
        Ok(product)
    }

    /// Products referencing both ids, newest first
    pub async fn list_in<S: Store>(store: &S, collection_id: &Id, category_id: &Id) -> Result<Vec<Product>> {
        store.list_products_in(collection_id, category_id).await
    }

    /// Every product, newest first, with collections expanded
    pub async fn list_all<S: Store>(store: &S) -> Result<Vec<ExpandedProduct>> {
        let products = store.list_products().await?;

        let ids: Vec<Id> = products
            .iter()
            .flat_map(|p| p.collections.iter().cloned())
            .unique()
            .collect();
        let lookup: HashMap<Id, Collection> = if ids.is_empty() {
            HashMap::new()
        } else {
            store
                .get_collections(&ids)
                .await?
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect()
        };

        Ok(products
            .into_iter()
            .map(|p| ExpandedProduct::populate(p, &lookup))
            .collect())
    }

    /// Delete a product reached through its collection and category
    pub async fn delete<S: Store>(
        store: &S,
        user: &UserContext,
        collection_id: &Id,
        category_id: &Id,
        product_id: &Id,
    ) -> Result<Product> {
        store
            .get_product(product_id)
            .await?
            .filter(|p| p.belongs_to(collection_id, category_id))
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        let product = store.delete_product(product_id).await?;

        log::info!("{} deleted product '{}' ({})", user.user_id, product.title, product.id);
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{CategoryOperations, CollectionOperations};
    use crate::model::{Category, NewCategory, NewCollection};
    use crate::store::traits::{CategoryStore, CollectionStore, ProductStore};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn staff() -> UserContext {
        UserContext::new("staff".to_string())
    }

    async fn collection_with_category(store: &MemoryStore, title: &str) -> (Collection, Category) {
        let collection = CollectionOperations::create(
            store,
            &staff(),
            NewCollection {
                title: Some(title.to_string()),
                image: Some("img".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let category = CategoryOperations::create(
            store,
            &staff(),
            &collection.id,
            NewCategory {
                name: Some("Shirts".to_string()),
                description: None,
                image: Some("img".to_string()),
            },
        )
        .await
        .unwrap();
        (collection, category)
    }

    fn tee(price: serde_json::Value) -> NewProduct {
        NewProduct {
            name: Some("Tee".to_string()),
            media: Some(vec!["http://x/tee.png".to_string()]),
            price: Some(price),
            sizes: Some(vec!["S".to_string(), "M".to_string()]),
            units_in_stock: Some(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_in_category_links_both_parents() {
        let store = MemoryStore::new();
        let (collection, category) = collection_with_category(&store, "Summer").await;

        let product = ProductOperations::create_in_category(
            &store,
            &staff(),
            &collection.id,
            &category.id,
            tee(json!("24.50")),
        )
        .await
        .unwrap();

        assert_eq!(product.price, Decimal::new(245, 1));
        assert_eq!(product.categories, vec![category.id.clone()]);
        assert_eq!(product.collections, vec![collection.id.clone()]);
        assert_eq!(product.variants.units_in_stock, Some(10));

        let stored_category = store.get_category(&category.id).await.unwrap().unwrap();
        let stored_collection = store.get_collection(&collection.id).await.unwrap().unwrap();
        assert_eq!(stored_category.products, vec![product.id.clone()]);
        assert_eq!(stored_collection.products, vec![product.id]);
    }

    #[tokio::test]
    async fn test_bad_price_is_rejected_before_any_lookup() {
        let store = MemoryStore::new();
        let missing = "missing".to_string();

        // Parents do not exist, yet validation wins
        for price in [json!(-5), json!("free"), json!(null)] {
            let err = ProductOperations::create_in_category(&store, &staff(), &missing, &missing, tee(price))
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_in_foreign_category_is_not_found() {
        let store = MemoryStore::new();
        let (summer, _) = collection_with_category(&store, "Summer").await;
        let (_, winter_shirts) = collection_with_category(&store, "Winter").await;

        let err = ProductOperations::create_in_category(
            &store,
            &staff(),
            &summer.id,
            &winter_shirts.id,
            tee(json!(10)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flat_create_requires_references() {
        let store = MemoryStore::new();
        let (collection, category) = collection_with_category(&store, "Summer").await;

        let err = ProductOperations::create(&store, &staff(), tee(json!(10))).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let mut input = tee(json!(10));
        input.categories = Some(OneOrMany::One(category.id.clone()));
        input.collections = Some(OneOrMany::Many(vec![collection.id.clone(), "gone".to_string()]));
        let err = ProductOperations::create(&store, &staff(), input).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let mut input = tee(json!(10));
        input.categories = Some(OneOrMany::One(category.id.clone()));
        input.collections = Some(OneOrMany::One(collection.id.clone()));
        let product = ProductOperations::create(&store, &staff(), input).await.unwrap();
        assert_eq!(product.collections, vec![collection.id]);
    }

    #[tokio::test]
    async fn test_list_in_matches_both_references_exactly() {
        let store = MemoryStore::new();
        let (summer, summer_shirts) = collection_with_category(&store, "Summer").await;
        let (winter, winter_shirts) = collection_with_category(&store, "Winter").await;

        let a = ProductOperations::create_in_category(&store, &staff(), &summer.id, &summer_shirts.id, tee(json!(1)))
            .await
            .unwrap();
        ProductOperations::create_in_category(&store, &staff(), &winter.id, &winter_shirts.id, tee(json!(2)))
            .await
            .unwrap();

        // Cross-listed: summer collection, winter category
        let mut cross = tee(json!(3));
        cross.categories = Some(OneOrMany::One(winter_shirts.id.clone()));
        cross.collections = Some(OneOrMany::One(summer.id.clone()));
        let c = ProductOperations::create(&store, &staff(), cross).await.unwrap();

        let listed = ProductOperations::list_in(&store, &summer.id, &summer_shirts.id).await.unwrap();
        assert_eq!(listed.iter().map(|p| &p.id).collect::<Vec<_>>(), vec![&a.id]);

        let listed = ProductOperations::list_in(&store, &summer.id, &winter_shirts.id).await.unwrap();
        assert_eq!(listed.iter().map(|p| &p.id).collect::<Vec<_>>(), vec![&c.id]);

        let listed = ProductOperations::list_in(&store, &"nope".to_string(), &summer_shirts.id)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_expands_collections() {
        let store = MemoryStore::new();
        let (collection, category) = collection_with_category(&store, "Summer").await;
        ProductOperations::create_in_category(&store, &staff(), &collection.id, &category.id, tee(json!(1)))
            .await
            .unwrap();

        let listed = ProductOperations::list_all(&store).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].collections[0].title, "Summer");
    }

    #[tokio::test]
    async fn test_delete_pulls_back_references() {
        let store = MemoryStore::new();
        let (collection, category) = collection_with_category(&store, "Summer").await;
        let product = ProductOperations::create_in_category(
            &store,
            &staff(),
            &collection.id,
            &category.id,
            tee(json!(1)),
        )
        .await
        .unwrap();

        let err = ProductOperations::delete(&store, &staff(), &collection.id, &"other".to_string(), &product.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        ProductOperations::delete(&store, &staff(), &collection.id, &category.id, &product.id)
            .await
            .unwrap();
        assert!(store.get_product(&product.id).await.unwrap().is_none());
        assert!(store.get_category(&category.id).await.unwrap().unwrap().products.is_empty());
        assert!(store.get_collection(&collection.id).await.unwrap().unwrap().products.is_empty());
    }
}
