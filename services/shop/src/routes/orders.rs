//! Order routes

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;

use crate::{
    auth::BearerToken,
    error::{ApiError, ApiResult},
    models::{CreateOrderRequest, CreateOrderResponse, Order},
    response::ApiSuccess,
    state::AppState,
    task::{Budget, run_with_deadline},
    validation::parse_id,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
}

/// Place an order for a product in the caller's cart
async fn create_order(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Json(request), _): WithRejection<Json<CreateOrderRequest>, ApiError>,
) -> ApiResult<ApiSuccess<CreateOrderResponse>> {
    let id = run_with_deadline(Budget::Long, async move {
        state.gate.check(&token, Some(request.user_id))?;
        Ok(state.orders.create_order(request).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(CreateOrderResponse { id }))
}

async fn get_order(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Order>> {
    let order = run_with_deadline(Budget::Short, async move {
        state.gate.check(&token, None)?;
        let id = parse_id(&id).ok_or(ApiError::InvalidOrderId)?;
        Ok(state.orders.get_order_by_id(id).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(order))
}
