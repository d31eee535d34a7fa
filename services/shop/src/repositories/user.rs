//! User repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{NewUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return its id. A taken email is `UniqueViolation`.
    async fn create_user(&self, user: &NewUser) -> DatabaseResult<i64>;

    async fn get_user_by_id(&self, id: i64) -> DatabaseResult<User>;

    async fn get_user_by_email(&self, email: &str) -> DatabaseResult<User>;

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> DatabaseResult<()>;
}

/// User repository
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, name, password_hash, phone_number, created_at, updated_at
    FROM users
"#;

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: &NewUser) -> DatabaseResult<i64> {
        info!(email = %user.email, "Creating new user");

        let row = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, phone_number, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.try_get("id").map_err(DatabaseError::from_query)
    }

    async fn get_user_by_id(&self, id: i64) -> DatabaseResult<User> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn get_user_by_email(&self, email: &str) -> DatabaseResult<User> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        info!(user_id = id, "Updating user password");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(password_hash)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}
