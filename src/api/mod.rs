pub mod category_handlers;
pub mod collection_handlers;
pub mod handlers;
pub mod product_handlers;
pub mod routes;
pub mod user_extractor;

pub use handlers::*;
pub use routes::*;
