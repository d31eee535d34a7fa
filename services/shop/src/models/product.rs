//! Product model and listing filter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product entity. `category_name` comes from the category join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in minor currency units
    pub price: i64,
    pub description: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Product listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
}

impl ProductFilter {
    pub fn by_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category_id.is_none()
    }
}

/// Query string of the product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<String>,
}
