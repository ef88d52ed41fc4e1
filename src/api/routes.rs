use axum::{
    routing::{delete, get},
    Router,
};

use crate::api::{category_handlers, collection_handlers, handlers, product_handlers, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Reference integrity report
        .route("/integrity", get(handlers::check_integrity::<S>))
        // Collections
        .route(
            "/collections",
            get(collection_handlers::list_collections::<S>)
                .post(collection_handlers::create_collection::<S>),
        )
        .route(
            "/collections/:collection_id",
            get(collection_handlers::get_collection::<S>)
                .delete(collection_handlers::delete_collection::<S>),
        )
        // Categories within a collection
        .route(
            "/collections/:collection_id/categories",
            get(category_handlers::list_categories::<S>)
                .post(category_handlers::create_category::<S>),
        )
        .route(
            "/collections/:collection_id/categories/:category_id",
            get(category_handlers::get_category::<S>)
                .delete(category_handlers::delete_category::<S>),
        )
        // Products within a category
        .route(
            "/collections/:collection_id/categories/:category_id/products",
            get(product_handlers::list_category_products::<S>)
                .post(product_handlers::create_category_product::<S>),
        )
        .route(
            "/collections/:collection_id/categories/:category_id/products/:product_id",
            delete(product_handlers::delete_category_product::<S>),
        )
        // Flat product endpoints
        .route(
            "/products",
            get(product_handlers::list_products::<S>).post(product_handlers::create_product::<S>),
        )
}
