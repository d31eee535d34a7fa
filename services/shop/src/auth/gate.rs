//! Bearer-token admission checks for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    auth::token::{TokenData, TokenError, TokenService},
    error::ApiError,
};

/// Authentication failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("expired token")]
    ExpiredToken,

    /// Token is valid but belongs to a different user than the resource
    #[error("token subject does not match the requested user")]
    InvalidSubject,

    #[error("unauthorized access")]
    Unauthorized,
}

/// Checks session tokens and optionally pins them to a user id
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header
    pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
        headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidToken)
    }

    /// Validate `token`; when `expected_subject` is given the token must
    /// belong to that user.
    pub fn check(
        &self,
        token: &str,
        expected_subject: Option<i64>,
    ) -> Result<TokenData, AuthError> {
        let data = self.tokens.validate(token).map_err(|e| match e {
            TokenError::InvalidToken => AuthError::InvalidToken,
            TokenError::ExpiredToken => AuthError::ExpiredToken,
            other => {
                error!(error = %other, "token validation failed unexpectedly");
                AuthError::Unauthorized
            }
        })?;

        match expected_subject {
            Some(expected) if expected != data.user_id => {
                warn!(
                    token_user_id = data.user_id,
                    requested_user_id = expected,
                    "token used for another user's resource"
                );
                Err(AuthError::InvalidSubject)
            }
            _ => Ok(data),
        }
    }
}

/// Raw bearer token taken from the request headers.
///
/// Extraction only checks the header shape; validation happens inside the
/// handler's deadline through [`AuthGate::check`].
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = AuthGate::bearer_token(&parts.headers)?;
        Ok(BearerToken(token.to_string()))
    }
}
