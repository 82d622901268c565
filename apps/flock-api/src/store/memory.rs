//! In-memory collaborator implementations.
//!
//! Stand-in for Postgres in the test suite. Referential checks are emulated
//! so the ingress failure paths behave like the real store.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use flock_common::ChatMessage;

use crate::models::branch::Branch;
use crate::models::group::{Group, GroupSummary};
use crate::models::group_member::{GroupMember, RosterEntry};
use crate::models::message::MessageRow;
use crate::models::user::{User, UserRole};

use super::{
    AccessScope, GroupDirectory, InsertedMessage, MembershipAuthority, MessageStore, StoreError,
};

#[derive(Default)]
struct Inner {
    branches: Vec<Branch>,
    users: Vec<User>,
    groups: Vec<Group>,
    members: Vec<GroupMember>,
    messages: Vec<MessageRow>,
}

impl Inner {
    fn user_name(&self, id: i64) -> Option<String> {
        self.users.iter().find(|u| u.id == id).map(|u| u.name.clone())
    }
}

/// One backend implementing all three collaborator traits over shared state.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_branch(&self, name: &str, location: Option<&str>) -> i64 {
        let mut inner = self.inner.write();
        let id = inner.branches.len() as i64 + 1;
        inner.branches.push(Branch {
            id,
            name: name.to_string(),
            location: location.map(str::to_string),
        });
        id
    }

    pub fn add_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
        branch_id: Option<i64>,
    ) -> i64 {
        let mut inner = self.inner.write();
        let id = inner.users.len() as i64 + 1;
        inner.users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            branch_id,
        });
        id
    }

    pub fn add_group(
        &self,
        branch_id: Option<i64>,
        name: &str,
        type_: Option<&str>,
        description: Option<&str>,
    ) -> i64 {
        let mut inner = self.inner.write();
        let id = inner.groups.len() as i64 + 1;
        inner.groups.push(Group {
            id,
            branch_id,
            name: name.to_string(),
            type_: type_.map(str::to_string),
            description: description.map(str::to_string),
            meeting_url: None,
        });
        id
    }

    pub fn add_membership(&self, user_id: i64, group_id: i64, role_in_group: Option<&str>) {
        let mut inner = self.inner.write();
        inner.members.push(GroupMember {
            user_id,
            group_id,
            role_in_group: role_in_group.map(str::to_string),
        });
    }

}

#[async_trait]
impl MessageStore for MemoryBackend {
    async fn insert(
        &self,
        group_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<InsertedMessage, StoreError> {
        let mut inner = self.inner.write();

        if !inner.groups.iter().any(|g| g.id == group_id) {
            return Err(StoreError::Constraint(format!(
                "messages.group_id references unknown group {group_id}"
            )));
        }
        if !inner.users.iter().any(|u| u.id == sender_id) {
            return Err(StoreError::Constraint(format!(
                "messages.sender_id references unknown user {sender_id}"
            )));
        }

        let id = inner.messages.len() as i64 + 1;
        let timestamp = Utc::now();
        inner.messages.push(MessageRow {
            id,
            group_id,
            sender_id,
            content: content.to_string(),
            created_at: timestamp,
        });

        Ok(InsertedMessage { id, timestamp })
    }

    async fn by_group_ordered(&self, group_id: i64) -> Result<Vec<ChatMessage>, StoreError> {
        let inner = self.inner.read();

        let mut rows: Vec<&MessageRow> = inner
            .messages
            .iter()
            .filter(|m| m.group_id == group_id)
            .collect();
        rows.sort_by_key(|m| (m.created_at, m.id));

        Ok(rows
            .into_iter()
            .map(|row| {
                let sender_name = inner.user_name(row.sender_id).unwrap_or_default();
                row.clone().into_chat_message(sender_name)
            })
            .collect())
    }

    async fn by_id(&self, id: i64) -> Result<ChatMessage, StoreError> {
        let inner = self.inner.read();

        let row = inner
            .messages
            .iter()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound)?;
        let sender_name = inner.user_name(row.sender_id).unwrap_or_default();

        Ok(row.clone().into_chat_message(sender_name))
    }
}

#[async_trait]
impl MembershipAuthority for MemoryBackend {
    async fn is_member(&self, user_id: i64, group_id: i64) -> Result<bool, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .iter()
            .any(|m| m.user_id == user_id && m.group_id == group_id))
    }

    async fn role_of(&self, user_id: i64) -> Result<UserRole, StoreError> {
        let inner = self.inner.read();
        let user = inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound)?;
        Ok(UserRole::parse(&user.role))
    }
}

#[async_trait]
impl GroupDirectory for MemoryBackend {
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_groups(&self, scope: AccessScope) -> Result<Vec<GroupSummary>, StoreError> {
        let inner = self.inner.read();

        let mut summaries: Vec<GroupSummary> = inner
            .groups
            .iter()
            .filter(|g| {
                scope.role.is_unrestricted()
                    || (g.branch_id.is_some() && g.branch_id == scope.branch_id)
            })
            .filter_map(|g| {
                let branch = inner.branches.iter().find(|b| Some(b.id) == g.branch_id)?;
                let member_count = inner
                    .members
                    .iter()
                    .filter(|m| m.group_id == g.id)
                    .count() as i64;
                Some(GroupSummary {
                    group: g.clone(),
                    branch_name: branch.name.clone(),
                    member_count,
                })
            })
            .collect();
        summaries.sort_by(|a, b| a.group.name.cmp(&b.group.name));

        Ok(summaries)
    }

    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn roster(&self, group_id: i64) -> Result<Vec<RosterEntry>, StoreError> {
        let inner = self.inner.read();

        let mut entries: Vec<RosterEntry> = inner
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .filter_map(|m| {
                let user = inner.users.iter().find(|u| u.id == m.user_id)?;
                Some(RosterEntry {
                    id: user.id,
                    name: user.name.clone(),
                    role: user.role.clone(),
                    role_in_group: m.role_in_group.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }
}
