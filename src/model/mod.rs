pub mod category;
pub mod collection;
pub mod common;
pub mod integrity;
pub mod product;
pub mod user_context;

pub use category::*;
pub use collection::*;
pub use common::*;
pub use integrity::*;
pub use product::*;
pub use user_context::*;
