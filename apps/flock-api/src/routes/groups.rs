//! Group listing and detail endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use flock_common::ChatMessage;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::group::{Group, GroupSummary};
use crate::models::group_member::RosterEntry;
use crate::store::AccessScope;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups/{id}", get(get_group))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "Groups",
    responses((status = 200, description = "Groups visible to the caller", body = Vec<GroupSummary>)),
)]
pub async fn list_groups(
    AuthUser {
        role, branch_id, ..
    }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupSummary>>, ApiError> {
    let groups = state
        .directory
        .list_groups(AccessScope { role, branch_id })
        .await?;

    Ok(Json(groups))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<RosterEntry>,
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
    pub is_member: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    tag = "Groups",
    params(("id" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group metadata, roster, and (for members or unrestricted roles) history", body = GroupDetailResponse),
        (status = 404, description = "No such group", body = ApiErrorBody),
    ),
)]
pub async fn get_group(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GroupDetailResponse>, ApiError> {
    let group = state
        .directory
        .group_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let members = state.directory.roster(id).await?;
    let is_member = state.membership.is_member(auth.user_id, id).await?;

    // Soft access gate: non-members still get the metadata, with an empty
    // message list.
    let messages = state.history.read(id, auth.user_id, auth.role).await?;

    Ok(Json(GroupDetailResponse {
        group,
        members,
        messages,
        is_member,
    }))
}
