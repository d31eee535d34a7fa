//! Store traits and their PostgreSQL implementations

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartStore, PgCartStore};
pub use category::{CategoryStore, PgCategoryStore};
pub use order::{OrderStore, PgOrderStore};
pub use product::{PgProductStore, ProductStore};
pub use user::{PgUserStore, UserStore};
