//! Account routes: registration, login, password and token refresh

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{patch, post},
};
use axum_extra::extract::WithRejection;

use crate::{
    auth::BearerToken,
    error::{ApiError, ApiResult},
    models::{CreateUserRequest, LoginRequest, LoginResponse, PasswordRequest},
    response::ApiSuccess,
    state::AppState,
    task::{Budget, run_with_deadline},
    validation::parse_id,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/login", post(login))
        .route(
            "/user/password/:id",
            patch(update_password).put(reset_password),
        )
        .route("/user/token/:id", post(refresh_token))
}

/// Register a new user; responds with the user id
async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<ApiSuccess<i64>> {
    let id = run_with_deadline(Budget::Long, async move {
        Ok(state.users.create_user(request).await?)
    })
    .await?;

    Ok(ApiSuccess::ok(id))
}

async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<ApiSuccess<LoginResponse>> {
    let response = run_with_deadline(Budget::Long, async move {
        let (token, data) = state.users.login(&request.email, &request.password).await?;
        Ok(LoginResponse {
            user_id: data.user_id,
            email: data.email,
            token,
        })
    })
    .await?;

    Ok(ApiSuccess::ok(response))
}

/// Change the password of the token's own user
async fn update_password(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<PasswordRequest>, ApiError>,
) -> ApiResult<ApiSuccess<i64>> {
    let user_id = run_with_deadline(Budget::Long, async move {
        let user_id = parse_id(&id).ok_or(ApiError::InvalidUserId)?;
        state.gate.check(&token, Some(user_id))?;
        state
            .users
            .update_password(user_id, &request.new_password, &request.current_password)
            .await?;
        Ok(user_id)
    })
    .await?;

    Ok(ApiSuccess::ok(user_id))
}

async fn reset_password(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<PasswordRequest>, ApiError>,
) -> ApiResult<ApiSuccess<i64>> {
    let user_id = run_with_deadline(Budget::Long, async move {
        let user_id = parse_id(&id).ok_or(ApiError::InvalidUserId)?;
        state.gate.check(&token, Some(user_id))?;
        state
            .users
            .reset_password(user_id, &request.new_password)
            .await?;
        Ok(user_id)
    })
    .await?;

    Ok(ApiSuccess::ok(user_id))
}

/// Exchange the caller's token for a fresh one
async fn refresh_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<String>> {
    let refreshed = run_with_deadline(Budget::Long, async move {
        let user_id = parse_id(&id).ok_or(ApiError::InvalidUserId)?;
        state.gate.check(&token, Some(user_id))?;
        Ok(state.users.refresh_token(&token)?)
    })
    .await?;

    Ok(ApiSuccess::ok(refreshed))
}
