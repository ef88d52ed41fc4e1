pub mod category_ops;
pub mod collection_ops;
pub mod integrity;
pub mod product_ops;
pub mod validate;

pub use category_ops::*;
pub use collection_ops::*;
pub use integrity::*;
pub use product_ops::*;
