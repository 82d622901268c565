//! Postgres-backed collaborator implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError, OptionalExtension};

use flock_common::ChatMessage;

use crate::db::pool::DbPool;
use crate::db::schema::{branches, group_members, groups, messages, users};
use crate::models::group::{Group, GroupSummary};
use crate::models::group_member::RosterEntry;
use crate::models::message::{MessageRow, NewMessage};
use crate::models::user::{User, UserRole};

use super::{
    AccessScope, GroupDirectory, InsertedMessage, MembershipAuthority, MessageStore, StoreError,
};

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::Constraint(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, info) => {
                StoreError::Constraint(info.message().to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for StoreError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn insert(
        &self,
        group_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<InsertedMessage, StoreError> {
        let mut conn = self.pool.get().await?;

        let (id, timestamp): (i64, DateTime<Utc>) = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(messages::table)
                .values(NewMessage {
                    group_id,
                    sender_id,
                    content,
                })
                .returning((messages::id, messages::created_at)),
            &mut conn,
        )
        .await?;

        Ok(InsertedMessage { id, timestamp })
    }

    async fn by_group_ordered(&self, group_id: i64) -> Result<Vec<ChatMessage>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(MessageRow, String)> = diesel_async::RunQueryDsl::load(
            messages::table
                .inner_join(users::table)
                .filter(messages::group_id.eq(group_id))
                .order((messages::created_at.asc(), messages::id.asc()))
                .select((MessageRow::as_select(), users::name)),
            &mut conn,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|(row, sender_name)| row.into_chat_message(sender_name))
            .collect())
    }

    async fn by_id(&self, id: i64) -> Result<ChatMessage, StoreError> {
        let mut conn = self.pool.get().await?;

        let (row, sender_name): (MessageRow, String) = diesel_async::RunQueryDsl::get_result(
            messages::table
                .inner_join(users::table)
                .filter(messages::id.eq(id))
                .select((MessageRow::as_select(), users::name)),
            &mut conn,
        )
        .await?;

        Ok(row.into_chat_message(sender_name))
    }
}

pub struct PgMembershipAuthority {
    pool: DbPool,
}

impl PgMembershipAuthority {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipAuthority for PgMembershipAuthority {
    async fn is_member(&self, user_id: i64, group_id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = diesel_async::RunQueryDsl::get_result(
            group_members::table
                .filter(group_members::group_id.eq(group_id))
                .filter(group_members::user_id.eq(user_id))
                .count(),
            &mut conn,
        )
        .await?;

        Ok(count > 0)
    }

    async fn role_of(&self, user_id: i64) -> Result<UserRole, StoreError> {
        let mut conn = self.pool.get().await?;

        let label: String = diesel_async::RunQueryDsl::get_result(
            users::table.find(user_id).select(users::role),
            &mut conn,
        )
        .await?;

        Ok(UserRole::parse(&label))
    }
}

pub struct PgGroupDirectory {
    pool: DbPool,
}

impl PgGroupDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupDirectory for PgGroupDirectory {
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;

        let user = diesel_async::RunQueryDsl::get_result(
            users::table
                .filter(users::email.eq(email))
                .select(User::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;

        let user = diesel_async::RunQueryDsl::get_result(
            users::table.find(id).select(User::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(user)
    }

    async fn list_groups(&self, scope: AccessScope) -> Result<Vec<GroupSummary>, StoreError> {
        let mut conn = self.pool.get().await?;

        let mut query = groups::table
            .inner_join(branches::table)
            .order(groups::name.asc())
            .select((Group::as_select(), branches::name))
            .into_boxed();

        if !scope.role.is_unrestricted() {
            // Branch scoping mirrors NULL semantics: a caller without a
            // branch sees nothing here.
            query = query.filter(groups::branch_id.eq(scope.branch_id));
        }

        let rows: Vec<(Group, String)> = diesel_async::RunQueryDsl::load(query, &mut conn).await?;

        let counts: Vec<(i64, i64)> = diesel_async::RunQueryDsl::load(
            group_members::table
                .group_by(group_members::group_id)
                .select((group_members::group_id, diesel::dsl::count_star())),
            &mut conn,
        )
        .await?;
        let counts: HashMap<i64, i64> = counts.into_iter().collect();

        Ok(rows
            .into_iter()
            .map(|(group, branch_name)| GroupSummary {
                member_count: counts.get(&group.id).copied().unwrap_or(0),
                group,
                branch_name,
            })
            .collect())
    }

    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, StoreError> {
        let mut conn = self.pool.get().await?;

        let group = diesel_async::RunQueryDsl::get_result(
            groups::table.find(id).select(Group::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(group)
    }

    async fn roster(&self, group_id: i64) -> Result<Vec<RosterEntry>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(i64, String, String, Option<String>)> = diesel_async::RunQueryDsl::load(
            group_members::table
                .inner_join(users::table)
                .filter(group_members::group_id.eq(group_id))
                .order(users::name.asc())
                .select((
                    users::id,
                    users::name,
                    users::role,
                    group_members::role_in_group,
                )),
            &mut conn,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, role, role_in_group)| RosterEntry {
                id,
                name,
                role,
                role_in_group,
            })
            .collect())
    }
}
