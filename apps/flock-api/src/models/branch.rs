use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::branches;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = branches)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = branches)]
pub struct NewBranch<'a> {
    pub name: &'a str,
    pub location: Option<&'a str>,
}
