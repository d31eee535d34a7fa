//! Payment gateway client
//!
//! Charges are created through a Midtrans-compatible Core API
//! (`POST {base_url}/v2/charge`). The gateway's response is kept as raw JSON
//! so it can be stored with the order exactly as received.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://api.sandbox.midtrans.com";

/// Payment gateway failures
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP status from the gateway
    #[error("payment gateway returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// HTTP succeeded but the body reports a failed charge
    #[error("payment gateway declined charge with status {status_code}: {message}")]
    Declined { status_code: String, message: String },
}

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub server_key: String,
    /// Per-request timeout for gateway calls
    pub timeout: Duration,
}

impl PaymentConfig {
    /// Create a new PaymentConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PAYMENT_SERVER_KEY`: gateway server key (required)
    /// - `PAYMENT_BASE_URL`: gateway base URL (default: Midtrans sandbox)
    /// - `PAYMENT_TIMEOUT_MS`: request timeout in milliseconds (default: 2500)
    pub fn from_env() -> anyhow::Result<Self> {
        let server_key = std::env::var("PAYMENT_SERVER_KEY")
            .map_err(|_| anyhow::anyhow!("PAYMENT_SERVER_KEY environment variable not set"))?;

        let base_url =
            std::env::var("PAYMENT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_ms = std::env::var("PAYMENT_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2500);

        Ok(PaymentConfig {
            base_url,
            server_key,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetails {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomExpiry {
    pub expiry_duration: u32,
    pub unit: String,
}

/// Body of a charge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    pub payment_type: String,
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetails>,
    pub customer_details: CustomerDetails,
    pub custom_expiry: CustomExpiry,
}

impl ChargeRequest {
    /// QRIS charge for a single item that expires after one day
    pub fn qris(
        order_id: String,
        gross_amount: i64,
        item: ItemDetails,
        customer: CustomerDetails,
    ) -> Self {
        ChargeRequest {
            payment_type: "qris".to_string(),
            transaction_details: TransactionDetails {
                order_id,
                gross_amount,
            },
            item_details: vec![item],
            customer_details: customer,
            custom_expiry: CustomExpiry {
                expiry_duration: 1,
                unit: "day".to_string(),
            },
        }
    }
}

/// Creates charges with an external payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit a charge and return the gateway's response verbatim
    async fn charge(&self, request: &ChargeRequest) -> Result<Value, PaymentError>;
}

/// HTTP client for the Midtrans Core API
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl HttpPaymentGateway {
    pub fn new(config: PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn charge_url(&self) -> String {
        format!("{}/v2/charge", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<Value, PaymentError> {
        info!(
            order_id = %request.transaction_details.order_id,
            gross_amount = request.transaction_details.gross_amount,
            "Submitting charge to payment gateway"
        );

        let response = self
            .client
            .post(self.charge_url())
            .basic_auth(&self.config.server_key, Some(""))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Payment gateway rejected charge");
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;

        // Midtrans reports charge failures in the body with HTTP 200
        if let Some(status_code) = body.get("status_code").and_then(Value::as_str) {
            if !status_code.starts_with('2') {
                let message = body
                    .get("status_message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                warn!(status_code, message = %message, "Payment gateway declined charge");
                return Err(PaymentError::Declined {
                    status_code: status_code.to_string(),
                    message,
                });
            }
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Serve `reply` on `/v2/charge` from a local listener and record requests
    async fn fake_gateway(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let app = Router::new().route(
            "/v2/charge",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    sink.lock().unwrap().push((auth, body));
                    (status, Json(reply)).into_response()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), captured)
    }

    fn gateway(base_url: String) -> HttpPaymentGateway {
        HttpPaymentGateway::new(PaymentConfig {
            base_url,
            server_key: "SB-server-key".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn request() -> ChargeRequest {
        ChargeRequest::qris(
            "corr-1".to_string(),
            3000,
            ItemDetails {
                id: "5".to_string(),
                name: "Kopi".to_string(),
                price: 1000,
                quantity: 3,
            },
            CustomerDetails {
                first_name: "Ayu".to_string(),
                email: "a@b.com".to_string(),
            },
        )
    }

    #[test]
    fn qris_request_shape() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(body["payment_type"], "qris");
        assert_eq!(body["transaction_details"]["gross_amount"], 3000);
        assert_eq!(body["item_details"][0]["quantity"], 3);
        assert_eq!(
            body["custom_expiry"],
            json!({"expiry_duration": 1, "unit": "day"})
        );
    }

    #[tokio::test]
    async fn successful_charge_returns_raw_body() {
        let reply = json!({
            "status_code": "201",
            "transaction_status": "pending",
            "order_id": "corr-1"
        });
        let (base_url, captured) = fake_gateway(StatusCode::OK, reply.clone()).await;

        let body = gateway(base_url).charge(&request()).await.unwrap();
        assert_eq!(body, reply);

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (auth, sent) = &captured[0];
        assert!(auth.as_deref().unwrap_or_default().starts_with("Basic "));
        assert_eq!(sent["transaction_details"]["order_id"], "corr-1");
    }

    #[tokio::test]
    async fn body_status_outside_2xx_is_declined() {
        let reply = json!({"status_code": "406", "status_message": "duplicate order id"});
        let (base_url, _) = fake_gateway(StatusCode::OK, reply).await;

        let err = gateway(base_url).charge(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Declined { ref status_code, .. } if status_code == "406"));
    }

    #[tokio::test]
    async fn http_failure_is_rejected() {
        let (base_url, _) =
            fake_gateway(StatusCode::UNAUTHORIZED, json!({"error": "bad key"})).await;

        let err = gateway(base_url).charge(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Rejected { status: 401, .. }));
    }
}
