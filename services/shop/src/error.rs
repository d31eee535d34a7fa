//! HTTP-facing error type for the shop service
//!
//! Each bounded context has its own error enum; the `From` impls below are the
//! single place where those are translated into the stable wire codes clients
//! see. Anything that is not a recognised business failure becomes
//! [`ApiError::Internal`], which is logged when rendered and shown to the
//! client only as `INTERNAL_SERVER_ERROR`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    auth::{gate::AuthError, token::TokenError},
    payment::PaymentError,
    response::ErrorBody,
    services::{
        category::CategoryError, order::OrderError, product::ProductError, user::UserError,
    },
};

/// Client-visible failure
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("user already exist")]
    UserAlreadyExist,

    #[error("data not found")]
    DataNotFound,

    #[error("bad request")]
    BadRequest,

    #[error("expired token")]
    ExpiredToken,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("request timeout")]
    RequestTimeout,

    #[error("invalid user id")]
    InvalidUserId,

    #[error("invalid product id")]
    InvalidProductId,

    #[error("invalid category id")]
    InvalidCategoryId,

    #[error("invalid order id")]
    InvalidOrderId,

    #[error("invalid order")]
    InvalidOrder,

    #[error("invalid quantity")]
    InvalidQuantity,

    #[error("unauthorized access")]
    UnauthorizedAccess,

    /// Unexpected failure; the cause is logged, never sent
    #[error("internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable code written to the `errors` array of the envelope
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UserAlreadyExist => "USER_ALREADY_EXIST",
            ApiError::DataNotFound => "DATA_NOT_FOUND",
            ApiError::BadRequest => "BAD_REQUEST",
            ApiError::ExpiredToken => "EXPIRED_TOKEN",
            ApiError::InvalidPassword => "INVALID_PASSWORD",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::InvalidEmail => "INVALID_EMAIL",
            ApiError::InvalidName => "INVALID_NAME",
            ApiError::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            ApiError::RequestTimeout => "REQUEST_TIMEOUT",
            ApiError::InvalidUserId => "INVALID_USER_ID",
            ApiError::InvalidProductId => "INVALID_PRODUCT_ID",
            ApiError::InvalidCategoryId => "INVALID_CATEGORY_ID",
            ApiError::InvalidOrderId => "INVALID_ORDER_ID",
            ApiError::InvalidOrder => "INVALID_ORDER",
            ApiError::InvalidQuantity => "INVALID_QUANTITY",
            ApiError::UnauthorizedAccess => "UNAUTHORIZED_ACCESS",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DataNotFound => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExist => StatusCode::CONFLICT,
            ApiError::ExpiredToken | ApiError::InvalidToken | ApiError::UnauthorizedAccess => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::RequestTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(error = ?cause, "internal error while serving request");
        }

        (self.status(), ErrorBody::new(self.code())).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "rejected request body");
        ApiError::BadRequest
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "rejected query string");
        ApiError::BadRequest
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => ApiError::InvalidToken,
            TokenError::ExpiredToken => ApiError::ExpiredToken,
            TokenError::Configuration(_) | TokenError::Internal(_) => {
                ApiError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::ExpiredToken => ApiError::ExpiredToken,
            AuthError::InvalidSubject => ApiError::InvalidUserId,
            AuthError::Unauthorized => ApiError::UnauthorizedAccess,
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AlreadyExist => ApiError::UserAlreadyExist,
            UserError::NotFound => ApiError::DataNotFound,
            UserError::InvalidEmail => ApiError::InvalidEmail,
            UserError::InvalidName => ApiError::InvalidName,
            UserError::InvalidPhoneNumber => ApiError::InvalidPhoneNumber,
            UserError::InvalidPassword => ApiError::InvalidPassword,
            UserError::InvalidUserId => ApiError::InvalidUserId,
            UserError::Token(token) => token.into(),
            UserError::Internal(cause) => ApiError::Internal(cause),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => ApiError::DataNotFound,
            ProductError::InvalidProductId => ApiError::InvalidProductId,
            ProductError::InvalidUserId => ApiError::InvalidUserId,
            ProductError::InvalidCategoryId => ApiError::InvalidCategoryId,
            ProductError::InvalidQuantity => ApiError::InvalidQuantity,
            ProductError::Internal(cause) => ApiError::Internal(cause),
        }
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound => ApiError::DataNotFound,
            CategoryError::InvalidCategoryId => ApiError::InvalidCategoryId,
            CategoryError::Internal(cause) => ApiError::Internal(cause),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound => ApiError::DataNotFound,
            OrderError::InvalidOrderId => ApiError::InvalidOrderId,
            OrderError::InvalidUserId => ApiError::InvalidUserId,
            OrderError::InvalidProductId => ApiError::InvalidProductId,
            OrderError::InvalidQuantity => ApiError::InvalidQuantity,
            OrderError::InvalidOrder => ApiError::InvalidOrder,
            OrderError::Payment(payment) => ApiError::Internal(anyhow::Error::new(payment)),
            OrderError::Internal(cause) => ApiError::Internal(cause),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}
