//! Response envelope shared by every endpoint
//!
//! Success: `{"status":"success","data":...}`
//! Failure: `{"status":"error","errors":["CODE", ...]}`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

#[derive(Debug, Serialize)]
struct SuccessBody<T> {
    status: &'static str,
    data: T,
}

/// Successful handler output wrapped in the envelope
#[derive(Debug)]
pub struct ApiSuccess<T> {
    status: StatusCode,
    data: T,
}

impl<T> ApiSuccess<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let body = SuccessBody {
            status: STATUS_SUCCESS,
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failure body; also used by clients and tests to decode error responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub fn new(code: &str) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            errors: vec![code.to_string()],
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn success_wraps_data() {
        let response = ApiSuccess::ok(json!({"id": 9})).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"id": 9}}));
    }

    #[test]
    fn error_body_carries_code() {
        let body = ErrorBody::new("INVALID_ORDER");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"status": "error", "errors": ["INVALID_ORDER"]})
        );
    }
}
