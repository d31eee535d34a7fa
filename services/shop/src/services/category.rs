//! Category lookups

use std::sync::Arc;

use common::error::DatabaseError;
use thiserror::Error;

use crate::{models::Category, repositories::CategoryStore};

#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("data not found")]
    NotFound,

    #[error("invalid category id")]
    InvalidCategoryId,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DatabaseError> for CategoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => CategoryError::NotFound,
            other => CategoryError::Internal(other.into()),
        }
    }
}

pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    pub async fn get_category_by_id(&self, id: i64) -> Result<Category, CategoryError> {
        if id <= 0 {
            return Err(CategoryError::InvalidCategoryId);
        }
        Ok(self.store.get_category_by_id(id).await?)
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, CategoryError> {
        Ok(self.store.get_categories().await?)
    }
}
