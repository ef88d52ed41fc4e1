use itertools::Itertools;
use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::logic::validate::{optional_text, required_text};
use crate::model::{Category, Collection, ExpandedCollection, Id, NewCollection, UserContext};
use crate::store::traits::Store;

pub struct CollectionOperations;

impl CollectionOperations {
    /// Create a collection, plus one category per distinct title listed in the request
    pub async fn create<S: Store>(
        store: &S,
        user: &UserContext,
        input: NewCollection,
    ) -> Result<Collection> {
        let title = required_text("title", input.title)?;
        let image = required_text("image", input.image)?;
        let description = optional_text(input.description);

        if store.find_collection_by_title(&title).await?.is_some() {
            return Err(CatalogError::conflict("Collection already exists"));
        }

        let mut collection = Collection::new(title, description, image);
        let categories: Vec<Category> = input
            .categories
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| optional_text(Some(t)))
            .unique()
            .map(|t| Category::new(collection.id.clone(), t, None, None))
            .collect();
        collection.categories = categories.iter().map(|c| c.id.clone()).collect();

        store.create_collection(collection.clone(), categories).await?;

        log::info!(
            "{} created collection '{}' ({}) with {} categories",
            user.user_id,
            collection.title,
            collection.id,
            collection.categories.len()
        );
        Ok(collection)
    }

    /// All collections, newest first, categories expanded
    pub async fn list<S: Store>(store: &S) -> Result<Vec<ExpandedCollection>> {
        let collections = store.list_collections().await?;
        expand(store, collections).await
    }

    pub async fn get<S: Store>(store: &S, id: &Id) -> Result<ExpandedCollection> {
        let collection = store
            .get_collection(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Collection not found"))?;

        let mut expanded = expand(store, vec![collection]).await?;
        expanded
            .pop()
            .ok_or_else(|| CatalogError::not_found("Collection not found"))
    }

    /// Delete a collection and its categories. Products referencing it are left in place.
    pub async fn delete<S: Store>(store: &S, user: &UserContext, id: &Id) -> Result<u64> {
        let removed = store.delete_collection(id).await?;

        log::info!(
            "{} deleted collection {} and {} categories",
            user.user_id,
            id,
            removed
        );
        Ok(removed)
    }
}

async fn expand<S: Store>(store: &S, collections: Vec<Collection>) -> Result<Vec<ExpandedCollection>> {
    let ids: Vec<Id> = collections
        .iter()
        .flat_map(|c| c.categories.iter().cloned())
        .unique()
        .collect();

    let lookup: HashMap<Id, Category> = if ids.is_empty() {
        HashMap::new()
    } else {
        store
            .get_categories(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect()
    };

    Ok(collections
        .into_iter()
        .map(|c| ExpandedCollection::populate(c, &lookup))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::{CategoryStore, CollectionStore};
    use crate::store::MemoryStore;

    fn summer() -> NewCollection {
        NewCollection {
            title: Some("Summer".to_string()),
            image: Some("http://x/y.png".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());

        let collection = CollectionOperations::create(&store, &user, summer()).await.unwrap();
        assert!(!collection.id.is_empty());
        assert_eq!(collection.title, "Summer");
        assert_eq!(collection.description, None);
    }

    #[tokio::test]
    async fn test_duplicate_title_is_conflict_and_writes_nothing() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());
        CollectionOperations::create(&store, &user, summer()).await.unwrap();

        let mut again = summer();
        again.categories = Some(vec!["Shirts".to_string()]);
        let err = CollectionOperations::create(&store, &user, again).await.unwrap_err();

        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(store.list_collections().await.unwrap().len(), 1);
        assert!(store.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_is_validation() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());
        let input = NewCollection {
            title: Some("Summer".to_string()),
            ..Default::default()
        };

        let err = CollectionOperations::create(&store, &user, input).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_inline_categories_are_deduplicated_in_order() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());
        let mut input = summer();
        input.categories = Some(vec![
            "Shirts".to_string(),
            "Hats".to_string(),
            " Shirts ".to_string(),
            "".to_string(),
        ]);

        let collection = CollectionOperations::create(&store, &user, input).await.unwrap();
        assert_eq!(collection.categories.len(), 2);

        let expanded = CollectionOperations::get(&store, &collection.id).await.unwrap();
        let titles: Vec<&str> = expanded.categories.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Shirts", "Hats"]);
        assert!(expanded.categories.iter().all(|c| c.collection == collection.id));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_owned_categories_only() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());

        let mut input = summer();
        input.categories = Some(vec!["Shirts".to_string(), "Hats".to_string()]);
        let summer = CollectionOperations::create(&store, &user, input).await.unwrap();

        let winter = CollectionOperations::create(
            &store,
            &user,
            NewCollection {
                title: Some("Winter".to_string()),
                image: Some("img".to_string()),
                categories: Some(vec!["Coats".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let removed = CollectionOperations::delete(&store, &user, &summer.id).await.unwrap();
        assert_eq!(removed, 2);

        assert!(store.get_collection(&summer.id).await.unwrap().is_none());
        let remaining = store.list_categories().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].collection, winter.id);
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_collection() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());
        let missing = "nope".to_string();

        assert!(matches!(
            CollectionOperations::get(&store, &missing).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            CollectionOperations::delete(&store, &user, &missing).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_expands_categories_newest_first() {
        let store = MemoryStore::new();
        let user = UserContext::new("staff".to_string());

        let mut input = summer();
        input.categories = Some(vec!["Shirts".to_string()]);
        CollectionOperations::create(&store, &user, input).await.unwrap();
        CollectionOperations::create(
            &store,
            &user,
            NewCollection {
                title: Some("Winter".to_string()),
                image: Some("img".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let listed = CollectionOperations::list(&store).await.unwrap();
        assert_eq!(listed[0].title, "Winter");
        assert_eq!(listed[1].title, "Summer");
        assert_eq!(listed[1].categories[0].title, "Shirts");
    }
}
