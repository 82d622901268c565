//! Session routes: email login and current-user lookup.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::auth::tokens;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::user::User;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/users/me", get(me))
}

// ---------------------------------------------------------------------------
// POST /api/v1/auth/login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Unknown email", body = ApiErrorBody),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = body.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "email".to_string(),
            message: "Email is required".to_string(),
        }]));
    }

    let user = state
        .directory
        .user_by_email(email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown email"))?;

    let access_token = tokens::issue(
        &state.config.token_secret,
        user.id,
        &user.role,
        user.branch_id,
        state.config.token_ttl_secs,
    )
    .map_err(|err| {
        tracing::error!(?err, "failed to sign session token");
        ApiError::internal("An internal error occurred")
    })?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.token_ttl_secs,
        user,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/v1/users/me
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 404, description = "User no longer exists", body = ApiErrorBody),
    ),
)]
pub async fn me(
    AuthUser { user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .directory
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user))
}
