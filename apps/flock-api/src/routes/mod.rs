pub mod auth;
pub mod groups;
pub mod health;
pub mod messages;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::chat::server::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest(
            "/api/v1",
            auth::router()
                .merge(groups::router())
                .merge(messages::router()),
        )
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Auth
        auth::login,
        auth::me,
        // Groups
        groups::list_groups,
        groups::get_group,
        // Messages
        messages::post_message,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::user::User,
            crate::models::group::Group,
            crate::models::group::GroupSummary,
            crate::models::group_member::RosterEntry,
            // Route request/response types
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            groups::GroupDetailResponse,
            messages::PostMessageRequest,
            messages::PostMessageResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Sessions"),
        (name = "Groups", description = "Group listing and detail"),
        (name = "Messages", description = "Messaging"),
    )
)]
pub struct ApiDoc;
