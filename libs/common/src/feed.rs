//! Client-side reconciliation of a group's message view.
//!
//! A consumer holds one `GroupFeed` per open group. History fetches replace
//! the view wholesale; live pushes append unless the message id is already
//! present. The id is the sole deduplication key — a sender receives its own
//! broadcast, and applying the same event twice must be a no-op. No
//! reordering happens on receipt: pushes are appended in arrival order, and
//! after a suspected gap (e.g. a reconnect) the consumer re-fetches history
//! instead of trusting the live stream to backfill.

use std::collections::HashSet;

use crate::protocol::{ChannelEvent, ChatMessage};

/// A client-local ordered view of one group's messages.
#[derive(Debug, Default)]
pub struct GroupFeed {
    messages: Vec<ChatMessage>,
    seen: HashSet<i64>,
}

impl GroupFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the view with a freshly fetched history.
    pub fn reset_history(&mut self, history: Vec<ChatMessage>) {
        self.seen = history.iter().map(|m| m.id).collect();
        self.messages = history;
    }

    /// Apply a pushed event. Returns `true` if the view changed.
    pub fn apply(&mut self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::NewMessage { message } => self.push(message),
        }
    }

    /// Append a message unless its id is already present.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
