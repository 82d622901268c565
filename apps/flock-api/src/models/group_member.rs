use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::group_members;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = group_members)]
pub struct GroupMember {
    pub user_id: i64,
    pub group_id: i64,
    pub role_in_group: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = group_members)]
pub struct NewGroupMember<'a> {
    pub user_id: i64,
    pub group_id: i64,
    pub role_in_group: Option<&'a str>,
}

/// One roster line in the group detail: the user joined with their
/// in-group role label.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub role_in_group: Option<String>,
}
