//! Cart repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;

use crate::models::{CartEntry, NewCartEntry};

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert an entry, replacing the quantity when the user already has the
    /// product in their cart. Unknown user/product is `ForeignKeyViolation`.
    async fn add_cart_entry(&self, entry: &NewCartEntry) -> DatabaseResult<()>;

    async fn get_carts_by_user_id(&self, user_id: i64) -> DatabaseResult<Vec<CartEntry>>;

    /// `NotFound` when the user has no entry for the product
    async fn delete_cart_entry(&self, user_id: i64, product_id: i64) -> DatabaseResult<()>;
}

#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn add_cart_entry(&self, entry: &NewCartEntry) -> DatabaseResult<()> {
        info!(
            user_id = entry.user_id,
            product_id = entry.product_id,
            quantity = entry.quantity,
            "Upserting cart entry"
        );

        sqlx::query(
            r#"
            INSERT INTO product_carts (user_id, product_id, quantity, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = EXCLUDED.created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.product_id)
        .bind(entry.quantity)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn get_carts_by_user_id(&self, user_id: i64) -> DatabaseResult<Vec<CartEntry>> {
        sqlx::query_as::<_, CartEntry>(
            r#"
            SELECT
                pc.user_id, pc.product_id,
                p.name AS product_name,
                p.price AS product_price,
                pc.quantity, pc.created_at, pc.updated_at
            FROM product_carts pc
            JOIN products p ON p.id = pc.product_id
            WHERE pc.user_id = $1
            ORDER BY pc.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn delete_cart_entry(&self, user_id: i64, product_id: i64) -> DatabaseResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_carts
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}
