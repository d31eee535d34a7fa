//! Order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payment state of an order, stored as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Unknown = 0,
    Settlement = 1,
    Pending = 2,
    Cancelled = 3,
}

impl OrderStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Values outside the known range read as `Unknown`
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => OrderStatus::Settlement,
            2 => OrderStatus::Pending,
            3 => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    /// Map a gateway `transaction_status`. Anything not final is pending.
    pub fn from_transaction_status(status: Option<&str>) -> Self {
        match status {
            Some("settlement") | Some("capture") => OrderStatus::Settlement,
            Some("cancel") | Some("deny") | Some("expire") | Some("failure") => {
                OrderStatus::Cancelled
            }
            _ => OrderStatus::Pending,
        }
    }
}

/// Order entity. User and product names/price come from joins.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub product_price: Option<i64>,
    pub quantity: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    /// Gateway response as stored at creation time
    pub gateway_response: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Order insertion payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    /// Serialized gateway response, stored verbatim
    pub gateway_response: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_integer_mapping() {
        for status in [
            OrderStatus::Unknown,
            OrderStatus::Settlement,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_i32(status.as_i32()), status);
        }
        assert_eq!(OrderStatus::from_i32(17), OrderStatus::Unknown);
    }

    #[test]
    fn gateway_status_defaults_to_pending() {
        assert_eq!(
            OrderStatus::from_transaction_status(Some("settlement")),
            OrderStatus::Settlement
        );
        assert_eq!(
            OrderStatus::from_transaction_status(Some("expire")),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::from_transaction_status(Some("pending")),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::from_transaction_status(None),
            OrderStatus::Pending
        );
    }

    #[test]
    fn status_serializes_as_name() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Settlement).unwrap(),
            "settlement"
        );
    }
}
