use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use crate::api::handlers::{json_body, AppState};
use crate::error::Result;
use crate::logic::CollectionOperations;
use crate::model::{Collection, ExpandedCollection, Id, NewCollection, UserContext};
use crate::store::traits::Store;

pub async fn list_collections<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ExpandedCollection>>> {
    let collections = CollectionOperations::list(&*state.store).await?;
    Ok(Json(collections))
}

pub async fn create_collection<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    payload: std::result::Result<Json<NewCollection>, JsonRejection>,
) -> Result<(StatusCode, Json<Collection>)> {
    let input = json_body(payload)?;
    let collection = CollectionOperations::create(&*state.store, &user, input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn get_collection<S: Store>(
    State(state): State<AppState<S>>,
    Path(collection_id): Path<Id>,
) -> Result<Json<ExpandedCollection>> {
    let collection = CollectionOperations::get(&*state.store, &collection_id).await?;
    Ok(Json(collection))
}

pub async fn delete_collection<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    Path(collection_id): Path<Id>,
) -> Result<Json<serde_json::Value>> {
    let removed = CollectionOperations::delete(&*state.store, &user, &collection_id).await?;
    Ok(Json(json!({
        "message": "Collection deleted successfully",
        "categoriesRemoved": removed,
    })))
}
