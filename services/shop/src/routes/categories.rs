//! Category routes

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    auth::BearerToken,
    error::{ApiError, ApiResult},
    models::Category,
    response::ApiSuccess,
    state::AppState,
    task::{Budget, run_with_deadline},
    validation::parse_id,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/:id", get(get_category))
}

async fn get_categories(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiSuccess<Vec<Category>>> {
    let categories = run_with_deadline(Budget::Medium, async move {
        state.gate.check(&token, None)?;
        Ok(state.categories.get_categories().await?)
    })
    .await?;

    Ok(ApiSuccess::ok(categories))
}

async fn get_category(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Category>> {
    let category = run_with_deadline(Budget::Short, async move {
        state.gate.check(&token, None)?;
        let id = parse_id(&id).ok_or(ApiError::InvalidCategoryId)?;
        Ok(state.categories.get_category_by_id(id).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(category))
}
