//! HTTP routes for the shop service
//!
//! Every protected handler runs token validation and the domain call inside
//! [`run_with_deadline`](crate::task::run_with_deadline), so a slow store or
//! gateway surfaces as `REQUEST_TIMEOUT` rather than a hung request.

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

mod categories;
mod orders;
mod products;
mod users;

/// Create the router for the shop service
pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(users::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router());

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "shop"
    }))
}
