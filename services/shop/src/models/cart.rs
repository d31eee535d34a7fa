//! Cart entries and their request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product in a user's cart. At most one entry per (user, product).
///
/// `product_name` and `product_price` come from the product join and
/// reflect the product's current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CartEntry {
    pub user_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Cart insertion payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartEntry {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /products/:id/carts`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddCartRequest {
    pub user_id: i64,
    pub quantity: i64,
}

/// Body of `DELETE /products/:id/carts`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveCartRequest {
    pub user_id: i64,
}

/// Identifies the cart entry that was written
#[derive(Debug, Clone, Serialize)]
pub struct CartEntryKey {
    pub user_id: i64,
    pub product_id: i64,
}
