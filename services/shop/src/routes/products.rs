//! Product listing, product detail and cart routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;

use crate::{
    auth::BearerToken,
    error::{ApiError, ApiResult},
    models::{
        AddCartRequest, CartEntry, CartEntryKey, Product, ProductFilter, ProductListQuery,
        RemoveCartRequest,
    },
    response::ApiSuccess,
    state::AppState,
    task::{Budget, run_with_deadline},
    validation::parse_id,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .route(
            "/products/:id/carts",
            post(add_cart_entry).delete(delete_cart_entry),
        )
        .route("/products/carts/:id", get(get_carts))
}

/// List products, optionally restricted to one category
async fn get_products(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Query(query), _): WithRejection<Query<ProductListQuery>, ApiError>,
) -> ApiResult<ApiSuccess<Vec<Product>>> {
    let products = run_with_deadline(Budget::Medium, async move {
        state.gate.check(&token, None)?;
        let filter = match query.category_id.as_deref() {
            None | Some("") => ProductFilter::default(),
            Some(raw) => {
                ProductFilter::by_category(parse_id(raw).ok_or(ApiError::InvalidCategoryId)?)
            }
        };
        Ok(state.products.get_products(filter).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(products))
}

async fn get_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Product>> {
    let product = run_with_deadline(Budget::Short, async move {
        state.gate.check(&token, None)?;
        let id = parse_id(&id).ok_or(ApiError::InvalidProductId)?;
        Ok(state.products.get_product_by_id(id).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(product))
}

async fn add_cart_entry(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<AddCartRequest>, ApiError>,
) -> ApiResult<ApiSuccess<CartEntryKey>> {
    let key = run_with_deadline(Budget::Long, async move {
        let product_id = parse_id(&id).ok_or(ApiError::InvalidProductId)?;
        state.gate.check(&token, Some(request.user_id))?;
        state
            .products
            .add_cart_entry(request.user_id, product_id, request.quantity)
            .await?;
        Ok(CartEntryKey {
            user_id: request.user_id,
            product_id,
        })
    })
    .await?;

    Ok(ApiSuccess::ok(key))
}

/// Remove a product from the cart; responds with the product id
async fn delete_cart_entry(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<RemoveCartRequest>, ApiError>,
) -> ApiResult<ApiSuccess<i64>> {
    let product_id = run_with_deadline(Budget::Medium, async move {
        let product_id = parse_id(&id).ok_or(ApiError::InvalidProductId)?;
        state.gate.check(&token, Some(request.user_id))?;
        state
            .products
            .delete_cart_entry(request.user_id, product_id)
            .await?;
        Ok(product_id)
    })
    .await?;

    Ok(ApiSuccess::ok(product_id))
}

/// Cart contents of the token's own user
async fn get_carts(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Vec<CartEntry>>> {
    let entries = run_with_deadline(Budget::Medium, async move {
        let user_id = parse_id(&id).ok_or(ApiError::InvalidUserId)?;
        state.gate.check(&token, Some(user_id))?;
        Ok(state.products.get_carts_by_user_id(user_id).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(entries))
}
