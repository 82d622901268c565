use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::groups;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = groups)]
pub struct Group {
    pub id: i64,
    pub branch_id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub description: Option<String>,
    pub meeting_url: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = groups)]
pub struct NewGroup<'a> {
    pub branch_id: Option<i64>,
    pub name: &'a str,
    pub type_: Option<&'a str>,
    pub description: Option<&'a str>,
    pub meeting_url: Option<&'a str>,
}

/// A group as it appears in the listing, joined with its branch and sized.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: Group,
    pub branch_name: String,
    pub member_count: i64,
}
