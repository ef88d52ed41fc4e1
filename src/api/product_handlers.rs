use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use crate::api::handlers::{json_body, AppState};
use crate::error::Result;
use crate::logic::ProductOperations;
use crate::model::{ExpandedProduct, Id, NewProduct, Product, UserContext};
use crate::store::traits::Store;

pub async fn list_category_products<S: Store>(
    State(state): State<AppState<S>>,
    Path((collection_id, category_id)): Path<(Id, Id)>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductOperations::list_in(&*state.store, &collection_id, &category_id).await?;
    Ok(Json(products))
}

pub async fn create_category_product<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    Path((collection_id, category_id)): Path<(Id, Id)>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = json_body(payload)?;
    let product = ProductOperations::create_in_category(
        &*state.store,
        &user,
        &collection_id,
        &category_id,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn delete_category_product<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    Path((collection_id, category_id, product_id)): Path<(Id, Id, Id)>,
) -> Result<Json<serde_json::Value>> {
    ProductOperations::delete(&*state.store, &user, &collection_id, &category_id, &product_id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn list_products<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ExpandedProduct>>> {
    let products = ProductOperations::list_all(&*state.store).await?;
    Ok(Json(products))
}

pub async fn create_product<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = json_body(payload)?;
    let product = ProductOperations::create(&*state.store, &user, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}
