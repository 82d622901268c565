use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::users;

/// Organization-wide roles, mirroring the `users.role` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    SuperAdmin,
    BranchAdmin,
    GroupLeader,
    Member,
}

impl UserRole {
    /// Whether this role may read any group's history without a membership row.
    pub fn is_unrestricted(self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::BranchAdmin => "branch_admin",
            UserRole::GroupLeader => "group_leader",
            UserRole::Member => "member",
        }
    }

    /// Parse a stored role label. Unknown labels fall back to the
    /// least-privileged role.
    pub fn parse(label: &str) -> Self {
        match label {
            "super_admin" => UserRole::SuperAdmin,
            "branch_admin" => UserRole::BranchAdmin,
            "group_leader" => UserRole::GroupLeader,
            _ => UserRole::Member,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub branch_id: Option<i64>,
}
