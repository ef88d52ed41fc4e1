//! In-process store for development, demos and tests.
//!
//! All three record maps live behind one lock so every multi-document
//! mutation happens under a single write guard.

use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::model::{pull_id, push_id, Category, Collection, Id, Product};
use crate::store::traits::{CategoryStore, CollectionStore, ProductStore, Store};

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct Tables {
    next_seq: u64,
    collections: HashMap<Id, Entry<Collection>>,
    categories: HashMap<Id, Entry<Category>>,
    products: HashMap<Id, Entry<Product>>,
}

impl Tables {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Records newest first; insertion order breaks timestamp ties
fn newest_first<'a, T: Clone + 'a>(
    entries: impl Iterator<Item = &'a Entry<T>>,
    created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    entries
        .sorted_by(|a, b| {
            created_at(&b.record)
                .cmp(&created_at(&a.record))
                .then(b.seq.cmp(&a.seq))
        })
        .map(|entry| entry.record.clone())
        .collect()
}

#[async_trait::async_trait]
impl CollectionStore for MemoryStore {
    async fn get_collection(&self, id: &Id) -> Result<Option<Collection>> {
        Ok(self.tables.read().collections.get(id).map(|e| e.record.clone()))
    }

    async fn find_collection_by_title(&self, title: &str) -> Result<Option<Collection>> {
        let tables = self.tables.read();
        Ok(tables
            .collections
            .values()
            .find(|e| e.record.title == title)
            .map(|e| e.record.clone()))
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let tables = self.tables.read();
        Ok(newest_first(tables.collections.values(), |c| c.created_at))
    }

    async fn get_collections(&self, ids: &[Id]) -> Result<Vec<Collection>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .unique()
            .filter_map(|id| tables.collections.get(id).map(|e| e.record.clone()))
            .collect())
    }

    async fn create_collection(&self, collection: Collection, categories: Vec<Category>) -> Result<()> {
        let mut tables = self.tables.write();

        if tables.collections.values().any(|e| e.record.title == collection.title) {
            return Err(CatalogError::conflict("Collection already exists"));
        }
        if categories.iter().map(|c| &c.title).duplicates().next().is_some() {
            return Err(CatalogError::conflict("Category already exists in this collection"));
        }

        for category in categories {
            let seq = tables.seq();
            tables.categories.insert(category.id.clone(), Entry { seq, record: category });
        }
        let seq = tables.seq();
        tables.collections.insert(collection.id.clone(), Entry { seq, record: collection });

        Ok(())
    }

    async fn delete_collection(&self, id: &Id) -> Result<u64> {
        let mut tables = self.tables.write();

        if !tables.collections.contains_key(id) {
            return Err(CatalogError::not_found("Collection not found"));
        }

        let before = tables.categories.len();
        tables.categories.retain(|_, e| &e.record.collection != id);
        let removed = (before - tables.categories.len()) as u64;
        tables.collections.remove(id);

        Ok(removed)
    }
}

#[async_trait::async_trait]
impl CategoryStore for MemoryStore {
    async fn get_category(&self, id: &Id) -> Result<Option<Category>> {
        Ok(self.tables.read().categories.get(id).map(|e| e.record.clone()))
    }

    async fn get_categories(&self, ids: &[Id]) -> Result<Vec<Category>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .unique()
            .filter_map(|id| tables.categories.get(id).map(|e| e.record.clone()))
            .collect())
    }

    async fn find_category_by_title(&self, collection_id: &Id, title: &str) -> Result<Option<Category>> {
        let tables = self.tables.read();
        Ok(tables
            .categories
            .values()
            .find(|e| &e.record.collection == collection_id && e.record.title == title)
            .map(|e| e.record.clone()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let tables = self.tables.read();
        Ok(newest_first(tables.categories.values(), |c| c.created_at))
    }

    async fn create_category(&self, category: Category) -> Result<()> {
        let mut tables = self.tables.write();

        if !tables.collections.contains_key(&category.collection) {
            return Err(CatalogError::not_found("Collection not found"));
        }
        if tables
            .categories
            .values()
            .any(|e| e.record.collection == category.collection && e.record.title == category.title)
        {
            return Err(CatalogError::conflict("Category already exists in this collection"));
        }

        if let Some(entry) = tables.collections.get_mut(&category.collection) {
            push_id(&mut entry.record.categories, &category.id);
            entry.record.touch();
        }
        let seq = tables.seq();
        tables.categories.insert(category.id.clone(), Entry { seq, record: category });

        Ok(())
    }

    async fn delete_category(&self, id: &Id) -> Result<Category> {
        let mut tables = self.tables.write();

        let owner = match tables.categories.get(id) {
            Some(entry) => entry.record.collection.clone(),
            None => return Err(CatalogError::not_found("Category not found")),
        };
        let Some(collection) = tables.collections.get_mut(&owner) else {
            return Err(CatalogError::not_found("Collection not found"));
        };

        pull_id(&mut collection.record.categories, id);
        collection.record.touch();

        tables
            .categories
            .remove(id)
            .map(|e| e.record)
            .ok_or_else(|| CatalogError::not_found("Category not found"))
    }
}

#[async_trait::async_trait]
impl ProductStore for MemoryStore {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>> {
        Ok(self.tables.read().products.get(id).map(|e| e.record.clone()))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read();
        Ok(newest_first(tables.products.values(), |p| p.created_at))
    }

    async fn list_products_in(&self, collection_id: &Id, category_id: &Id) -> Result<Vec<Product>> {
        let tables = self.tables.read();
        Ok(newest_first(
            tables
                .products
                .values()
                .filter(|e| e.record.belongs_to(collection_id, category_id)),
            |p| p.created_at,
        ))
    }

    async fn create_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write();

        // Check every parent before touching any of them
        if let Some(missing) = product
            .collections
            .iter()
            .find(|id| !tables.collections.contains_key(*id))
        {
            return Err(CatalogError::not_found(format!("Collection {} not found", missing)));
        }
        if let Some(missing) = product
            .categories
            .iter()
            .find(|id| !tables.categories.contains_key(*id))
        {
            return Err(CatalogError::not_found(format!("Category {} not found", missing)));
        }

        for id in &product.collections {
            if let Some(entry) = tables.collections.get_mut(id) {
                push_id(&mut entry.record.products, &product.id);
                entry.record.touch();
            }
        }
        for id in &product.categories {
            if let Some(entry) = tables.categories.get_mut(id) {
                push_id(&mut entry.record.products, &product.id);
                entry.record.touch();
            }
        }
        let seq = tables.seq();
        tables.products.insert(product.id.clone(), Entry { seq, record: product });

        Ok(())
    }

    async fn delete_product(&self, id: &Id) -> Result<Product> {
        let mut tables = self.tables.write();

        let product = tables
            .products
            .remove(id)
            .map(|e| e.record)
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        for collection_id in &product.collections {
            if let Some(entry) = tables.collections.get_mut(collection_id) {
                if pull_id(&mut entry.record.products, id) {
                    entry.record.touch();
                }
            }
        }
        for category_id in &product.categories {
            if let Some(entry) = tables.categories.get_mut(category_id) {
                if pull_id(&mut entry.record.products, id) {
                    entry.record.touch();
                }
            }
        }

        Ok(product)
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product_in(collection: &Collection, category: &Category) -> Product {
        Product::new(
            "Tee".to_string(),
            String::new(),
            Vec::new(),
            Decimal::new(1500, 2),
            vec![category.id.clone()],
            vec![collection.id.clone()],
            Default::default(),
        )
    }

    #[tokio::test]
    async fn test_create_collection_rejects_duplicate_title() {
        let store = MemoryStore::new();
        let first = Collection::new("Summer".to_string(), None, "img".to_string());
        store.create_collection(first, Vec::new()).await.unwrap();

        let second = Collection::new("Summer".to_string(), None, "img".to_string());
        let err = store.create_collection(second, Vec::new()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(store.list_collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_category_without_owner_leaves_it_in_place() {
        let store = MemoryStore::new();
        let orphan = Category::new("no-such-collection".to_string(), "Loose".to_string(), None, None);
        {
            let mut tables = store.tables.write();
            let seq = tables.seq();
            tables.categories.insert(orphan.id.clone(), Entry { seq, record: orphan.clone() });
        }

        let err = store.delete_category(&orphan.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(store.get_category(&orphan.id).await.unwrap(), Some(orphan));
    }

    #[tokio::test]
    async fn test_create_product_with_missing_parent_writes_nothing() {
        let store = MemoryStore::new();
        let collection = Collection::new("Summer".to_string(), None, "img".to_string());
        store.create_collection(collection.clone(), Vec::new()).await.unwrap();
        let ghost = Category::new(collection.id.clone(), "Ghost".to_string(), None, None);

        let err = store
            .create_product(product_in(&collection, &ghost))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let stored = store.get_collection(&collection.id).await.unwrap().unwrap();
        assert!(stored.products.is_empty());
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_back_references_follow_create_and_delete() {
        let store = MemoryStore::new();
        let collection = Collection::new("Summer".to_string(), None, "img".to_string());
        store.create_collection(collection.clone(), Vec::new()).await.unwrap();
        let category = Category::new(collection.id.clone(), "Shirts".to_string(), None, None);
        store.create_category(category.clone()).await.unwrap();

        let product = product_in(&collection, &category);
        store.create_product(product.clone()).await.unwrap();

        let stored_category = store.get_category(&category.id).await.unwrap().unwrap();
        assert_eq!(stored_category.products, vec![product.id.clone()]);

        store.delete_product(&product.id).await.unwrap();
        let stored_category = store.get_category(&category.id).await.unwrap().unwrap();
        let stored_collection = store.get_collection(&collection.id).await.unwrap().unwrap();
        assert!(stored_category.products.is_empty());
        assert!(stored_collection.products.is_empty());
    }

    #[tokio::test]
    async fn test_list_collections_newest_first() {
        let store = MemoryStore::new();
        for title in ["A", "B", "C"] {
            let collection = Collection::new(title.to_string(), None, "img".to_string());
            store.create_collection(collection, Vec::new()).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }
}
