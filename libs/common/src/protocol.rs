//! Wire format for the live channel.
//!
//! These types are shared between the server's broadcast path and any Rust
//! consumer of the push stream; the JSON shape is part of the public contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat message as it travels over the wire, enriched with the
/// sender's display name so receivers need no follow-up lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    /// Creation time, assigned by the store at insert.
    pub timestamp: DateTime<Utc>,
}

/// An event pushed to every live connection attached to a group.
///
/// Serializes as `{"type": "NEW_MESSAGE", "message": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelEvent {
    #[serde(rename = "NEW_MESSAGE")]
    NewMessage { message: ChatMessage },
}

impl ChannelEvent {
    pub fn new_message(message: ChatMessage) -> Self {
        Self::NewMessage { message }
    }
}
