//! Membership-gated history reads.

use std::sync::Arc;

use flock_common::ChatMessage;

use crate::models::user::UserRole;
use crate::store::{MembershipAuthority, MessageStore, StoreError};

pub struct HistoryReader {
    store: Arc<dyn MessageStore>,
    membership: Arc<dyn MembershipAuthority>,
}

impl HistoryReader {
    pub fn new(store: Arc<dyn MessageStore>, membership: Arc<dyn MembershipAuthority>) -> Self {
        Self { store, membership }
    }

    /// Read a group's ordered history on behalf of `user_id` with `role`.
    ///
    /// Unrestricted roles read unconditionally. Everyone else needs a
    /// membership row; without one the read fails soft to an empty list so
    /// the rest of the group's metadata can still render.
    pub async fn read(
        &self,
        group_id: i64,
        user_id: i64,
        role: UserRole,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        if role.is_unrestricted() || self.membership.is_member(user_id, group_id).await? {
            return self.store.by_group_ordered(group_id).await;
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::memory::MemoryBackend;
    use crate::store::MessageStore as _;

    struct Fixture {
        backend: Arc<MemoryBackend>,
        reader: HistoryReader,
        member: i64,
        outsider: i64,
        group: i64,
    }

    async fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let branch = backend.add_branch("Main Campus", None);
        let member = backend.add_user("Jane Smith", "jane@example.org", UserRole::GroupLeader, Some(branch));
        let outsider = backend.add_user("Bob Wilson", "bob@example.org", UserRole::Member, Some(branch));
        let group = backend.add_group(Some(branch), "Worship Team", None, None);
        backend.add_membership(member, group, Some("Leader"));

        backend.insert(group, member, "first").await.unwrap();
        backend.insert(group, member, "second").await.unwrap();

        let reader = HistoryReader::new(backend.clone(), backend.clone());
        Fixture {
            backend,
            reader,
            member,
            outsider,
            group,
        }
    }

    #[tokio::test]
    async fn member_reads_full_ordered_history() {
        let f = fixture().await;
        let history = f.reader.read(f.group, f.member, UserRole::GroupLeader).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn non_member_gets_an_empty_history_not_an_error() {
        let f = fixture().await;
        let history = f.reader.read(f.group, f.outsider, UserRole::Member).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn membership_row_unlocks_the_next_read() {
        let f = fixture().await;
        assert!(f.reader.read(f.group, f.outsider, UserRole::Member).await.unwrap().is_empty());

        f.backend.add_membership(f.outsider, f.group, None);

        let history = f.reader.read(f.group, f.outsider, UserRole::Member).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn unrestricted_role_reads_without_membership() {
        let f = fixture().await;
        let admin = f.backend.add_user("John Doe", "admin@example.org", UserRole::SuperAdmin, None);
        let history = f.reader.read(f.group, admin, UserRole::SuperAdmin).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn branch_admin_is_not_unrestricted() {
        let f = fixture().await;
        let admin = f.backend.add_user("Pat Lee", "pat@example.org", UserRole::BranchAdmin, None);
        let history = f.reader.read(f.group, admin, UserRole::BranchAdmin).await.unwrap();
        assert!(history.is_empty());
    }
}
