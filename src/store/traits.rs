use crate::error::Result;
use crate::model::{Category, Collection, Id, Product};

#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get_collection(&self, id: &Id) -> Result<Option<Collection>>;
    async fn find_collection_by_title(&self, title: &str) -> Result<Option<Collection>>;
    /// All collections, newest first
    async fn list_collections(&self) -> Result<Vec<Collection>>;
    async fn get_collections(&self, ids: &[Id]) -> Result<Vec<Collection>>;
    /// Insert a collection together with categories created inline with it.
    /// Fails with Conflict if the title (or a category title within it) is taken.
    async fn create_collection(&self, collection: Collection, categories: Vec<Category>) -> Result<()>;
    /// Delete the collection and every category owned by it.
    /// Returns the number of categories removed; NotFound if the collection is absent.
    async fn delete_collection(&self, id: &Id) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get_category(&self, id: &Id) -> Result<Option<Category>>;
    async fn get_categories(&self, ids: &[Id]) -> Result<Vec<Category>>;
    async fn find_category_by_title(&self, collection_id: &Id, title: &str) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    /// Insert the category and append its id to the owning collection's list
    async fn create_category(&self, category: Category) -> Result<()>;
    /// Pull the category id from its owning collection, then delete the category.
    /// NotFound if the category or its owning collection is absent; nothing is written then.
    async fn delete_category(&self, id: &Id) -> Result<Category>;
}

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>>;
    /// All products, newest first
    async fn list_products(&self) -> Result<Vec<Product>>;
    /// Products referencing both the collection and the category, newest first
    async fn list_products_in(&self, collection_id: &Id, category_id: &Id) -> Result<Vec<Product>>;
    /// Insert the product and append its id to every referenced category and collection.
    /// NotFound if any referenced record is absent.
    async fn create_product(&self, product: Product) -> Result<()>;
    /// Delete the product and pull its id from every category and collection it references
    async fn delete_product(&self, id: &Id) -> Result<Product>;
}

pub trait Store: CollectionStore + CategoryStore + ProductStore + Send + Sync {}
