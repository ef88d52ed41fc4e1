use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use crate::api::handlers::{json_body, AppState};
use crate::error::Result;
use crate::logic::CategoryOperations;
use crate::model::{Category, Id, NewCategory, UserContext};
use crate::store::traits::Store;

pub async fn list_categories<S: Store>(
    State(state): State<AppState<S>>,
    Path(collection_id): Path<Id>,
) -> Result<Json<Vec<Category>>> {
    let categories = CategoryOperations::list(&*state.store, &collection_id).await?;
    Ok(Json(categories))
}

pub async fn create_category<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    Path(collection_id): Path<Id>,
    payload: std::result::Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>)> {
    let input = json_body(payload)?;
    let category = CategoryOperations::create(&*state.store, &user, &collection_id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category<S: Store>(
    State(state): State<AppState<S>>,
    Path((collection_id, category_id)): Path<(Id, Id)>,
) -> Result<Json<Category>> {
    let category = CategoryOperations::get(&*state.store, &collection_id, &category_id).await?;
    Ok(Json(category))
}

pub async fn delete_category<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    Path((collection_id, category_id)): Path<(Id, Id)>,
) -> Result<Json<serde_json::Value>> {
    CategoryOperations::delete(&*state.store, &user, &collection_id, &category_id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
