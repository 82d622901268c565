use chrono::{DateTime, Utc};
use diesel::prelude::*;

use flock_common::ChatMessage;

use crate::db::schema::messages;

/// A message row as stored. Immutable once created; there is no changeset.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
pub struct MessageRow {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage<'a> {
    pub group_id: i64,
    pub sender_id: i64,
    pub content: &'a str,
}

impl MessageRow {
    /// Attach the sender's display name to produce the wire payload.
    pub fn into_chat_message(self, sender_name: String) -> ChatMessage {
        ChatMessage {
            id: self.id,
            group_id: self.group_id,
            sender_id: self.sender_id,
            sender_name,
            content: self.content,
            timestamp: self.created_at,
        }
    }
}
