//! Order creation through the payment gateway
//!
//! An order can only be placed for a product that is already in the buyer's
//! cart. Name and price are taken from the cart entry, the charge is submitted
//! to the gateway, and the order is stored together with the gateway's raw
//! response. There is no idempotency key: retrying a request charges again.

use std::sync::Arc;

use anyhow::Context;
use common::error::DatabaseError;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    clock::Clock,
    models::{CreateOrderRequest, NewOrder, Order, OrderStatus},
    payment::{ChargeRequest, CustomerDetails, ItemDetails, PaymentError, PaymentGateway},
    repositories::{CartStore, OrderStore, UserStore},
};

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("data not found")]
    NotFound,

    #[error("invalid order id")]
    InvalidOrderId,

    #[error("invalid user id")]
    InvalidUserId,

    #[error("invalid product id")]
    InvalidProductId,

    #[error("invalid quantity")]
    InvalidQuantity,

    /// The product is not in the buyer's cart
    #[error("invalid order")]
    InvalidOrder,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DatabaseError> for OrderError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => OrderError::NotFound,
            other => OrderError::Internal(other.into()),
        }
    }
}

pub struct OrderOrchestrator {
    orders: Arc<dyn OrderStore>,
    carts: Arc<dyn CartStore>,
    users: Arc<dyn UserStore>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl OrderOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        carts: Arc<dyn CartStore>,
        users: Arc<dyn UserStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            carts,
            users,
            gateway,
            clock,
        }
    }

    /// Charge for a product in the buyer's cart and persist the order
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<i64, OrderError> {
        validate_request(&request)?;

        let cart = self.carts.get_carts_by_user_id(request.user_id).await?;
        let entry = cart
            .into_iter()
            .find(|entry| entry.product_id == request.product_id)
            .ok_or(OrderError::InvalidOrder)?;

        let total_amount = request
            .quantity
            .checked_mul(entry.product_price)
            .ok_or(OrderError::InvalidQuantity)?;

        let customer = self.users.get_user_by_id(request.user_id).await?;

        let correlation_id = Uuid::new_v4().to_string();
        let charge = ChargeRequest::qris(
            correlation_id.clone(),
            total_amount,
            ItemDetails {
                id: entry.product_id.to_string(),
                name: entry.product_name,
                price: entry.product_price,
                quantity: request.quantity,
            },
            CustomerDetails {
                first_name: customer.name,
                email: customer.email,
            },
        );

        let response = self.gateway.charge(&charge).await?;
        let status = OrderStatus::from_transaction_status(
            response
                .get("transaction_status")
                .and_then(serde_json::Value::as_str),
        );
        let gateway_response =
            serde_json::to_string(&response).context("failed to serialize gateway response")?;

        let order = NewOrder {
            user_id: request.user_id,
            product_id: request.product_id,
            quantity: request.quantity,
            total_amount,
            status,
            gateway_response,
            created_at: self.clock.now(),
        };
        let id = self.orders.create_order(&order).await?;

        info!(
            order_id = id,
            correlation_id = %correlation_id,
            user_id = request.user_id,
            total_amount,
            "Order created"
        );
        Ok(id)
    }

    pub async fn get_order_by_id(&self, id: i64) -> Result<Order, OrderError> {
        if id <= 0 {
            return Err(OrderError::InvalidOrderId);
        }
        Ok(self.orders.get_order_by_id(id).await?)
    }
}

fn validate_request(request: &CreateOrderRequest) -> Result<(), OrderError> {
    if request.user_id <= 0 {
        return Err(OrderError::InvalidUserId);
    }
    if request.product_id <= 0 {
        return Err(OrderError::InvalidProductId);
    }
    if request.quantity <= 0 {
        return Err(OrderError::InvalidQuantity);
    }
    Ok(())
}
