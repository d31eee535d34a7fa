//! Product repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;

use crate::models::{Product, ProductFilter};

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product_by_id(&self, id: i64) -> DatabaseResult<Product>;

    /// All products matching `filter`, ordered by id
    async fn get_products(&self, filter: ProductFilter) -> DatabaseResult<Vec<Product>>;
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.id, p.name, p.price, p.description, p.category_id,
        c.name AS category_name,
        p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get_product_by_id(&self, id: i64) -> DatabaseResult<Product> {
        sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn get_products(&self, filter: ProductFilter) -> DatabaseResult<Vec<Product>> {
        let query = match filter.category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Product>(&format!(
                    "{SELECT_PRODUCT} WHERE p.category_id = $1 ORDER BY p.id"
                ))
                .bind(category_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY p.id"))
                    .fetch_all(&self.pool)
                    .await
            }
        };

        query.map_err(DatabaseError::from_query)
    }
}
