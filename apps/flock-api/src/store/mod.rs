//! Collaborator interfaces consumed by the chat core and the REST surface.
//!
//! Backed by Postgres in production and an in-memory implementation in tests,
//! so the fan-out path can be exercised without a live database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use flock_common::ChatMessage;

use crate::models::group::{Group, GroupSummary};
use crate::models::group_member::RosterEntry;
use crate::models::user::{User, UserRole};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// A referential or uniqueness constraint rejected the write.
    #[error("{0}")]
    Constraint(String),
    #[error("{0}")]
    Backend(String),
}

/// Identity and creation time assigned by the store at insert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertedMessage {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
}

/// Durable append-only log of chat messages per group.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message. Ids are assigned monotonically by the store;
    /// unknown group or sender references fail as [`StoreError::Constraint`]
    /// with nothing inserted.
    async fn insert(
        &self,
        group_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<InsertedMessage, StoreError>;

    /// A group's full history, ordered by timestamp ascending with id as
    /// the tie-break.
    async fn by_group_ordered(&self, group_id: i64) -> Result<Vec<ChatMessage>, StoreError>;

    /// One message enriched with its sender's display name.
    async fn by_id(&self, id: i64) -> Result<ChatMessage, StoreError>;
}

/// Answers membership and role questions; never mutated by this core.
#[async_trait]
pub trait MembershipAuthority: Send + Sync {
    async fn is_member(&self, user_id: i64, group_id: i64) -> Result<bool, StoreError>;
    async fn role_of(&self, user_id: i64) -> Result<UserRole, StoreError>;
}

/// Which slice of the organization a caller may list.
#[derive(Debug, Clone, Copy)]
pub struct AccessScope {
    pub role: UserRole,
    pub branch_id: Option<i64>,
}

/// User and group reads backing the REST surface.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Group summaries visible to `scope`: everything for unrestricted
    /// roles, otherwise only the caller's branch.
    async fn list_groups(&self, scope: AccessScope) -> Result<Vec<GroupSummary>, StoreError>;
    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, StoreError>;
    async fn roster(&self, group_id: i64) -> Result<Vec<RosterEntry>, StoreError>;
}
