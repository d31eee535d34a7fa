//! Domain services sitting between the HTTP handlers and the stores

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::CategoryService;
pub use order::OrderOrchestrator;
pub use product::{ProductCatalogCache, ProductService};
pub use user::UserService;
