//! Message write path.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::chat::ingress::IngressError;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/messages", post(post_message))
}

// ---------------------------------------------------------------------------
// POST /api/v1/messages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub group_id: i64,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostMessageResponse {
    pub id: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "Messages",
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message persisted and fanned out", body = PostMessageResponse),
        (status = 400, description = "Empty content or unknown group", body = ApiErrorBody),
    ),
)]
pub async fn post_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<PostMessageResponse>), ApiError> {
    // The sender is the authenticated caller, never a body field.
    let id = state
        .ingress
        .post_message(body.group_id, auth.user_id, &body.content)
        .await
        .map_err(|err| match err {
            IngressError::EmptyContent => ApiError::validation(vec![FieldError {
                field: "content".to_string(),
                message: "Message content is required".to_string(),
            }]),
            IngressError::ContentTooLong => ApiError::validation(vec![FieldError {
                field: "content".to_string(),
                message: "Message content must be 4000 characters or fewer".to_string(),
            }]),
            IngressError::Store(store) => store.into(),
        })?;

    Ok((StatusCode::CREATED, Json(PostMessageResponse { id })))
}
