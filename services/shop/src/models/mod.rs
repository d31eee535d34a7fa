//! Domain models and request/response payloads

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{AddCartRequest, CartEntry, CartEntryKey, NewCartEntry, RemoveCartRequest};
pub use category::Category;
pub use order::{CreateOrderRequest, CreateOrderResponse, NewOrder, Order, OrderStatus};
pub use product::{Product, ProductFilter, ProductListQuery};
pub use user::{CreateUserRequest, LoginRequest, LoginResponse, NewUser, PasswordRequest, User};
