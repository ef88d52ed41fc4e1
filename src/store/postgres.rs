use anyhow::Context;
use serde::de::DeserializeOwned;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    types::Json,
    PgPool, Postgres, Row, Transaction,
};

use crate::error::{CatalogError, Result};
use crate::model::{pull_id, push_id, Category, Collection, Id, Product};
use crate::store::traits::{CategoryStore, CollectionStore, ProductStore, Store};

/// Document store on PostgreSQL.
///
/// Every record is a JSONB document. Multi-document mutations run in one
/// transaction and lock parent rows in a fixed order (collections, then
/// categories, then products).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

type Tx<'c> = Transaction<'c, Postgres>;

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Close every pooled connection. Used on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn begin(&self) -> Result<Tx<'static>> {
        Ok(self.pool.begin().await.context("Failed to begin transaction")?)
    }
}

fn decode<T: DeserializeOwned>(row: &PgRow) -> anyhow::Result<T> {
    let Json(doc) = row
        .try_get::<Json<T>, _>("doc")
        .context("Failed to decode document")?;
    Ok(doc)
}

fn decode_all<T: DeserializeOwned>(rows: &[PgRow]) -> Result<Vec<T>> {
    Ok(rows.iter().map(decode).collect::<anyhow::Result<Vec<T>>>()?)
}

fn decode_optional<T: DeserializeOwned>(row: Option<PgRow>) -> Result<Option<T>> {
    Ok(row.as_ref().map(decode).transpose()?)
}

/// Unique-constraint violations become Conflict, anything else Internal
fn write_error(err: sqlx::Error, conflict: &str, context: &'static str) -> CatalogError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CatalogError::conflict(conflict);
        }
    }
    CatalogError::Internal(anyhow::Error::new(err).context(context))
}

async fn lock_collections(tx: &mut Tx<'_>, ids: &[Id]) -> Result<Vec<Collection>> {
    let rows = sqlx::query("SELECT doc FROM collections WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(ids.to_vec())
        .fetch_all(&mut **tx)
        .await
        .context("Failed to lock collections")?;
    decode_all(&rows)
}

async fn lock_categories(tx: &mut Tx<'_>, ids: &[Id]) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT doc FROM categories WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(ids.to_vec())
        .fetch_all(&mut **tx)
        .await
        .context("Failed to lock categories")?;
    decode_all(&rows)
}

async fn save_collection(tx: &mut Tx<'_>, collection: &Collection) -> Result<()> {
    sqlx::query("UPDATE collections SET doc = $2 WHERE id = $1")
        .bind(&collection.id)
        .bind(Json(collection))
        .execute(&mut **tx)
        .await
        .context("Failed to update collection")?;
    Ok(())
}

async fn save_category(tx: &mut Tx<'_>, category: &Category) -> Result<()> {
    sqlx::query("UPDATE categories SET doc = $2 WHERE id = $1")
        .bind(&category.id)
        .bind(Json(category))
        .execute(&mut **tx)
        .await
        .context("Failed to update category")?;
    Ok(())
}

async fn insert_category(tx: &mut Tx<'_>, category: &Category) -> Result<()> {
    sqlx::query(
        "INSERT INTO categories (id, collection_id, title, doc, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&category.id)
    .bind(&category.collection)
    .bind(&category.title)
    .bind(Json(category))
    .bind(category.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        write_error(
            e,
            "Category already exists in this collection",
            "Failed to insert category",
        )
    })?;
    Ok(())
}

/// First requested id that was not returned by a lookup
fn first_missing<'a>(requested: &'a [Id], found: &[Id]) -> Option<&'a Id> {
    requested.iter().find(|id| !found.contains(id))
}

#[async_trait::async_trait]
impl CollectionStore for PostgresStore {
    async fn get_collection(&self, id: &Id) -> Result<Option<Collection>> {
        let row = sqlx::query("SELECT doc FROM collections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch collection")?;
        decode_optional(row)
    }

    async fn find_collection_by_title(&self, title: &str) -> Result<Option<Collection>> {
        let row = sqlx::query("SELECT doc FROM collections WHERE title = $1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch collection by title")?;
        decode_optional(row)
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query("SELECT doc FROM collections ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list collections")?;
        decode_all(&rows)
    }

    async fn get_collections(&self, ids: &[Id]) -> Result<Vec<Collection>> {
        let rows = sqlx::query("SELECT doc FROM collections WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch collections")?;
        decode_all(&rows)
    }

    async fn create_collection(&self, collection: Collection, categories: Vec<Category>) -> Result<()> {
        let mut tx = self.begin().await?;

        sqlx::query("INSERT INTO collections (id, title, doc, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&collection.id)
            .bind(&collection.title)
            .bind(Json(&collection))
            .bind(collection.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Collection already exists", "Failed to insert collection"))?;

        for category in &categories {
            insert_category(&mut tx, category).await?;
        }

        tx.commit().await.context("Failed to commit collection")?;
        Ok(())
    }

    async fn delete_collection(&self, id: &Id) -> Result<u64> {
        let mut tx = self.begin().await?;

        if lock_collections(&mut tx, std::slice::from_ref(id)).await?.is_empty() {
            return Err(CatalogError::not_found("Collection not found"));
        }

        let removed = sqlx::query("DELETE FROM categories WHERE collection_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete collection categories")?
            .rows_affected();

        sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete collection")?;

        tx.commit().await.context("Failed to commit collection delete")?;
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl CategoryStore for PostgresStore {
    async fn get_category(&self, id: &Id) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT doc FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category")?;
        decode_optional(row)
    }

    async fn get_categories(&self, ids: &[Id]) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT doc FROM categories WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch categories")?;
        decode_all(&rows)
    }

    async fn find_category_by_title(&self, collection_id: &Id, title: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT doc FROM categories WHERE collection_id = $1 AND title = $2")
            .bind(collection_id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category by title")?;
        decode_optional(row)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT doc FROM categories ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;
        decode_all(&rows)
    }

    async fn create_category(&self, category: Category) -> Result<()> {
        let mut tx = self.begin().await?;

        let mut collection = lock_collections(&mut tx, std::slice::from_ref(&category.collection))
            .await?
            .pop()
            .ok_or_else(|| CatalogError::not_found("Collection not found"))?;

        insert_category(&mut tx, &category).await?;

        push_id(&mut collection.categories, &category.id);
        collection.touch();
        save_collection(&mut tx, &collection).await?;

        tx.commit().await.context("Failed to commit category")?;
        Ok(())
    }

    async fn delete_category(&self, id: &Id) -> Result<Category> {
        let owner = self
            .get_category(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category not found"))?
            .collection;

        let mut tx = self.begin().await?;

        let mut collection = lock_collections(&mut tx, std::slice::from_ref(&owner))
            .await?
            .pop()
            .ok_or_else(|| CatalogError::not_found("Collection not found"))?;

        // Re-read under lock; the category may have gone since the lookup above
        let category = lock_categories(&mut tx, std::slice::from_ref(id))
            .await?
            .pop()
            .filter(|c| c.collection == owner)
            .ok_or_else(|| CatalogError::not_found("Category not found"))?;

        pull_id(&mut collection.categories, id);
        collection.touch();
        save_collection(&mut tx, &collection).await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete category")?;

        tx.commit().await.context("Failed to commit category delete")?;
        Ok(category)
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresStore {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT doc FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch product")?;
        decode_optional(row)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT doc FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list products")?;
        decode_all(&rows)
    }

    async fn list_products_in(&self, collection_id: &Id, category_id: &Id) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM products
            WHERE doc @> jsonb_build_object('collections', jsonb_build_array($1::text))
              AND doc @> jsonb_build_object('categories', jsonb_build_array($2::text))
            ORDER BY created_at DESC
            "#,
        )
        .bind(collection_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;
        decode_all(&rows)
    }

    async fn create_product(&self, product: Product) -> Result<()> {
        let mut tx = self.begin().await?;

        let mut collections = lock_collections(&mut tx, &product.collections).await?;
        let found: Vec<Id> = collections.iter().map(|c| c.id.clone()).collect();
        if let Some(missing) = first_missing(&product.collections, &found) {
            return Err(CatalogError::not_found(format!("Collection {} not found", missing)));
        }

        let mut categories = lock_categories(&mut tx, &product.categories).await?;
        let found: Vec<Id> = categories.iter().map(|c| c.id.clone()).collect();
        if let Some(missing) = first_missing(&product.categories, &found) {
            return Err(CatalogError::not_found(format!("Category {} not found", missing)));
        }

        sqlx::query("INSERT INTO products (id, doc, created_at) VALUES ($1, $2, $3)")
            .bind(&product.id)
            .bind(Json(&product))
            .bind(product.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Product already exists", "Failed to insert product"))?;

        for collection in &mut collections {
            push_id(&mut collection.products, &product.id);
            collection.touch();
            save_collection(&mut tx, collection).await?;
        }
        for category in &mut categories {
            push_id(&mut category.products, &product.id);
            category.touch();
            save_category(&mut tx, category).await?;
        }

        tx.commit().await.context("Failed to commit product")?;
        Ok(())
    }

    async fn delete_product(&self, id: &Id) -> Result<Product> {
        if self.get_product(id).await?.is_none() {
            return Err(CatalogError::not_found("Product not found"));
        }

        let mut tx = self.begin().await?;

        let rows = sqlx::query(
            r#"
            SELECT doc FROM collections
            WHERE doc @> jsonb_build_object('products', jsonb_build_array($1::text))
            ORDER BY id FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to lock product collections")?;
        for mut collection in decode_all::<Collection>(&rows)? {
            pull_id(&mut collection.products, id);
            collection.touch();
            save_collection(&mut tx, &collection).await?;
        }

        let rows = sqlx::query(
            r#"
            SELECT doc FROM categories
            WHERE doc @> jsonb_build_object('products', jsonb_build_array($1::text))
            ORDER BY id FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to lock product categories")?;
        for mut category in decode_all::<Category>(&rows)? {
            pull_id(&mut category.products, id);
            category.touch();
            save_category(&mut tx, &category).await?;
        }

        let row = sqlx::query("DELETE FROM products WHERE id = $1 RETURNING doc")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to delete product")?;

        // Deleted concurrently: dropping the transaction rolls back the pulls above
        let product = decode_optional::<Product>(row)?
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        tx.commit().await.context("Failed to commit product delete")?;
        Ok(product)
    }
}

impl Store for PostgresStore {}
