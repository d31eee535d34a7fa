//! Custom error types for the common library
//!
//! This module defines infrastructure error types shared by every
//! repository in the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// The queried row does not exist
    #[error("Row not found")]
    NotFound,

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint rejected the write
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query into the variants callers
    /// care about. Anything unrecognised stays an opaque `Query` error.
    pub fn from_query(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => DatabaseError::NotFound,
            SqlxError::Database(ref db_err) => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                let code = db_err.code().map(|code| code.into_owned());
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => DatabaseError::UniqueViolation(constraint),
                    Some(FOREIGN_KEY_VIOLATION) => DatabaseError::ForeignKeyViolation(constraint),
                    _ => DatabaseError::Query(err),
                }
            }
            other => DatabaseError::Query(other),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
