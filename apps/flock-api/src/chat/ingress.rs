//! Persist-then-notify message ingress.

use std::sync::Arc;

use thiserror::Error;

use flock_common::ChannelEvent;

use crate::store::{MessageStore, StoreError};

use super::dispatch::BroadcastDispatcher;

/// Longest accepted message body.
pub const MAX_CONTENT_LEN: usize = 4000;

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("message content is required")]
    EmptyContent,
    #[error("message content must be 4000 characters or fewer")]
    ContentTooLong,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The single point where write-then-fan-out ordering is guaranteed.
pub struct MessageIngress {
    store: Arc<dyn MessageStore>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl MessageIngress {
    pub fn new(store: Arc<dyn MessageStore>, dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Persist a message, then fan it out to the group's live connections.
    ///
    /// The insert completes and the stored row is read back (enriched with
    /// the sender's display name) before the broadcast runs, so a push can
    /// never carry an id that history doesn't already serve. The assigned id
    /// is returned to the caller regardless of how many connections the
    /// broadcast reached.
    pub async fn post_message(
        &self,
        group_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<i64, IngressError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(IngressError::EmptyContent);
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(IngressError::ContentTooLong);
        }

        let inserted = self.store.insert(group_id, sender_id, content).await?;
        let message = self.store.by_id(inserted.id).await?;

        let delivered = self
            .dispatcher
            .broadcast(group_id, &ChannelEvent::new_message(message));
        tracing::debug!(group_id, message_id = inserted.id, delivered, "message posted");

        Ok(inserted.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_common::ChatMessage;

    use crate::chat::registry::GroupChannelRegistry;
    use crate::models::user::UserRole;
    use crate::store::memory::MemoryBackend;

    struct Fixture {
        backend: Arc<MemoryBackend>,
        registry: Arc<GroupChannelRegistry>,
        ingress: MessageIngress,
        user: i64,
        group: i64,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let branch = backend.add_branch("Main Campus", None);
        let user = backend.add_user("Jane Smith", "jane@example.org", UserRole::GroupLeader, Some(branch));
        let group = backend.add_group(Some(branch), "Worship Team", Some("Ministry"), None);

        let registry = Arc::new(GroupChannelRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(registry.clone()));
        let ingress = MessageIngress::new(backend.clone(), dispatcher);

        Fixture {
            backend,
            registry,
            ingress,
            user,
            group,
        }
    }

    #[tokio::test]
    async fn pushed_message_is_already_fetchable() {
        let f = fixture();
        let (conn, mut rx) = f.registry.channel();
        f.registry.attach(f.group, conn);

        let id = f.ingress.post_message(f.group, f.user, "Hello").await.unwrap();

        let frame = rx.try_recv().unwrap();
        let ChannelEvent::NewMessage { message } = serde_json::from_str(&frame).unwrap();
        assert_eq!(message.id, id);

        // The pushed payload matches the record history serves.
        let stored: Vec<ChatMessage> = f.backend.by_group_ordered(f.group).await.unwrap();
        assert_eq!(stored, vec![message]);
    }

    #[tokio::test]
    async fn returns_id_even_when_no_connection_is_reachable() {
        let f = fixture();
        let (conn, rx) = f.registry.channel();
        f.registry.attach(f.group, conn);
        drop(rx);

        let id = f.ingress.post_message(f.group, f.user, "Hello").await.unwrap();
        assert!(id > 0);
    }

    #[tokio::test]
    async fn blank_content_is_rejected_before_any_write() {
        let f = fixture();
        let (conn, mut rx) = f.registry.channel();
        f.registry.attach(f.group, conn);

        for content in ["", "   ", "\n\t"] {
            let err = f.ingress.post_message(f.group, f.user, content).await.unwrap_err();
            assert!(matches!(err, IngressError::EmptyContent));
        }

        assert!(f.backend.by_group_ordered(f.group).await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let f = fixture();
        let long = "x".repeat(MAX_CONTENT_LEN + 1);
        let err = f.ingress.post_message(f.group, f.user, &long).await.unwrap_err();
        assert!(matches!(err, IngressError::ContentTooLong));
    }

    #[tokio::test]
    async fn store_rejection_means_no_broadcast() {
        let f = fixture();
        let (conn, mut rx) = f.registry.channel();
        f.registry.attach(f.group, conn);

        let err = f.ingress.post_message(999, f.user, "Hello").await.unwrap_err();
        assert!(matches!(err, IngressError::Store(StoreError::Constraint(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn content_is_trimmed_before_storage() {
        let f = fixture();
        let id = f.ingress.post_message(f.group, f.user, "  Hello  ").await.unwrap();
        let message = f.backend.by_id(id).await.unwrap();
        assert_eq!(message.content, "Hello");
    }

    #[tokio::test]
    async fn sequential_posts_arrive_in_store_order() {
        let f = fixture();
        let (conn, mut rx) = f.registry.channel();
        f.registry.attach(f.group, conn);

        let mut ids = Vec::new();
        for n in 1..=4 {
            ids.push(f.ingress.post_message(f.group, f.user, &format!("m{n}")).await.unwrap());
        }

        let history = f.backend.by_group_ordered(f.group).await.unwrap();
        let stored_ids: Vec<i64> = history.iter().map(|m| m.id).collect();
        assert_eq!(stored_ids, ids);

        for expected in &ids {
            let frame = rx.try_recv().unwrap();
            let ChannelEvent::NewMessage { message } = serde_json::from_str(&frame).unwrap();
            assert_eq!(message.id, *expected);
        }
    }
}
