//! Order repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};

use crate::models::{NewOrder, Order, OrderStatus};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> DatabaseResult<i64>;

    async fn get_order_by_id(&self, id: i64) -> DatabaseResult<Order>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Stored gateway responses are JSON text; anything else is kept as a string
fn parse_gateway_response(order_id: i64, raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(order_id, error = %e, "Stored gateway response is not JSON");
        Value::String(raw)
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let status: i32 = row.try_get("status")?;

    Ok(Order {
        id,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        user_email: row.try_get("user_email")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        product_price: row.try_get("product_price")?,
        quantity: row.try_get("quantity")?,
        total_amount: row.try_get("total_amount")?,
        status: OrderStatus::from_i32(status),
        gateway_response: parse_gateway_response(id, row.try_get("gateway_response")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, order: &NewOrder) -> DatabaseResult<i64> {
        info!(
            user_id = order.user_id,
            product_id = order.product_id,
            total_amount = order.total_amount,
            "Persisting order"
        );

        let row = sqlx::query(
            r#"
            INSERT INTO orders
                (user_id, product_id, quantity, total_amount, status, gateway_response, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(order.total_amount)
        .bind(order.status.as_i32())
        .bind(&order.gateway_response)
        .bind(order.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.try_get("id").map_err(DatabaseError::from_query)
    }

    async fn get_order_by_id(&self, id: i64) -> DatabaseResult<Order> {
        let row = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id,
                u.name AS user_name,
                u.email AS user_email,
                o.product_id,
                p.name AS product_name,
                p.price AS product_price,
                o.quantity, o.total_amount, o.status, o.gateway_response,
                o.created_at, o.updated_at
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            LEFT JOIN products p ON p.id = o.product_id
            WHERE o.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        order_from_row(&row).map_err(DatabaseError::from_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool};
    use serde_json::json;

    #[test]
    fn gateway_response_text_is_parsed_or_kept() {
        assert_eq!(
            parse_gateway_response(1, r#"{"status_code":"201"}"#.to_string()),
            json!({"status_code": "201"})
        );
        assert_eq!(
            parse_gateway_response(2, "upstream said no".to_string()),
            Value::String("upstream said no".to_string())
        );
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL"]
    async fn row_missing_columns_is_an_error() -> anyhow::Result<()> {
        let pool = init_pool(&DatabaseConfig::from_env()?).await?;
        let row = sqlx::query("SELECT 1::BIGINT AS id, 'two' AS status")
            .fetch_one(&pool)
            .await?;

        let mapped = order_from_row(&row).map_err(DatabaseError::from_query);
        assert!(matches!(mapped, Err(DatabaseError::Query(_))));
        Ok(())
    }
}
