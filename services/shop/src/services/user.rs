//! User accounts: registration, login, password management

use std::sync::Arc;

use common::error::DatabaseError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{Argon2Hasher, TokenData, TokenError, TokenService},
    clock::Clock,
    models::{CreateUserRequest, NewUser},
    repositories::UserStore,
    validation::{validate_email, validate_name, validate_password, validate_phone_number},
};

#[derive(Error, Debug)]
pub enum UserError {
    #[error("user already exist")]
    AlreadyExist,

    #[error("data not found")]
    NotFound,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid user id")]
    InvalidUserId,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => UserError::NotFound,
            DatabaseError::UniqueViolation(_) => UserError::AlreadyExist,
            other => UserError::Internal(other.into()),
        }
    }
}

pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hasher: Argon2Hasher,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        hasher: Argon2Hasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            clock,
        }
    }

    /// Register a user and return the new id
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<i64, UserError> {
        validate_email(&request.email)?;
        validate_name(&request.name)?;
        validate_phone_number(&request.phone_number)?;
        validate_password(&request.password)?;

        let new_user = NewUser {
            email: request.email,
            name: request.name,
            password_hash: self.hasher.spawn_hash(&request.password).await?,
            phone_number: request.phone_number,
            created_at: self.clock.now(),
        };

        let id = self.store.create_user(&new_user).await?;
        info!(user_id = id, "User registered");
        Ok(id)
    }

    /// Check credentials and issue a session token
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, TokenData), UserError> {
        if email.is_empty() {
            return Err(UserError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(UserError::InvalidPassword);
        }

        let user = self.store.get_user_by_email(email).await?;
        if !self.hasher.spawn_verify(password, &user.password_hash).await? {
            return Err(UserError::InvalidPassword);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        Ok((
            token,
            TokenData {
                user_id: user.id,
                email: user.email,
            },
        ))
    }

    /// Change a password after verifying the current one
    pub async fn update_password(
        &self,
        user_id: i64,
        new_password: &str,
        current_password: &str,
    ) -> Result<(), UserError> {
        if user_id <= 0 {
            return Err(UserError::InvalidUserId);
        }
        if current_password.is_empty() {
            return Err(UserError::InvalidPassword);
        }
        validate_password(new_password)?;

        let user = self.store.get_user_by_id(user_id).await?;
        if !self
            .hasher
            .spawn_verify(current_password, &user.password_hash)
            .await?
        {
            return Err(UserError::InvalidPassword);
        }

        let hash = self.hasher.spawn_hash(new_password).await?;
        self.store
            .update_password(user_id, &hash, self.clock.now())
            .await?;
        info!(user_id, "Password updated");
        Ok(())
    }

    /// Overwrite a password without checking the current one
    pub async fn reset_password(&self, user_id: i64, new_password: &str) -> Result<(), UserError> {
        if user_id <= 0 {
            return Err(UserError::InvalidUserId);
        }
        validate_password(new_password)?;

        // Surface a missing user as NotFound before paying for the hash
        self.store.get_user_by_id(user_id).await?;

        let hash = self.hasher.spawn_hash(new_password).await?;
        self.store
            .update_password(user_id, &hash, self.clock.now())
            .await?;
        info!(user_id, "Password reset");
        Ok(())
    }

    /// Exchange a valid token for a fresh one
    pub fn refresh_token(&self, token: &str) -> Result<String, UserError> {
        Ok(self.tokens.refresh(token)?)
    }
}
