use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::logic::validate::{optional_text, required_text};
use crate::model::{Category, Id, NewCategory, UserContext};
use crate::store::traits::Store;

pub struct CategoryOperations;

impl CategoryOperations {
    pub async fn create<S: Store>(
        store: &S,
        user: &UserContext,
        collection_id: &Id,
        input: NewCategory,
    ) -> Result<Category> {
        let name = required_text("name", input.name)?;
        let image = required_text("image", input.image)?;
        let description = optional_text(input.description);

        if store.get_collection(collection_id).await?.is_none() {
            return Err(CatalogError::not_found("Collection not found"));
        }
        if store
            .find_category_by_title(collection_id, &name)
            .await?
            .is_some()
        {
            return Err(CatalogError::conflict("Category already exists in this collection"));
        }

        let category = Category::new(collection_id.clone(), name, description, Some(image));
        store.create_category(category.clone()).await?;

        log::info!(
            "{} created category '{}' ({}) in collection {}",
            user.user_id,
            category.title,
            category.id,
            collection_id
        );
        Ok(category)
    }

    /// Categories of one collection, in the collection's list order
    pub async fn list<S: Store>(store: &S, collection_id: &Id) -> Result<Vec<Category>> {
        let collection = store
            .get_collection(collection_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Collection not found"))?;

        if collection.categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut lookup: HashMap<Id, Category> = store
            .get_categories(&collection.categories)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(collection
            .categories
            .iter()
            .filter_map(|id| lookup.remove(id))
            .collect())
    }

    pub async fn get<S: Store>(store: &S, collection_id: &Id, category_id: &Id) -> Result<Category> {
        owned_category(store, collection_id, category_id).await
    }

    /// Pull the category from its collection and delete it. Its products keep their references.
    pub async fn delete<S: Store>(
        store: &S,
        user: &UserContext,
        collection_id: &Id,
        category_id: &Id,
    ) -> Result<Category> {
        owned_category(store, collection_id, category_id).await?;
        let category = store.delete_category(category_id).await?;

        log::info!(
            "{} deleted category '{}' ({}) from collection {}",
            user.user_id,
            category.title,
            category.id,
            collection_id
        );
        Ok(category)
    }
}

async fn owned_category<S: Store>(store: &S, collection_id: &Id, category_id: &Id) -> Result<Category> {
    store
        .get_category(category_id)
        .await?
        .filter(|c| &c.collection == collection_id)
        .ok_or_else(|| CatalogError::not_found("Category not found"))
}
