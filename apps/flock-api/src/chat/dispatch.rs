//! Fan-out of one message event to a group's attached connections.

use std::sync::Arc;

use flock_common::ChannelEvent;

use super::registry::{Frame, GroupChannelRegistry};

/// Delivers events to every live connection registered for a group.
///
/// Best-effort notification layer only: the message store is the durability
/// mechanism, so there is no retry and no backlog. A connection that misses
/// a push catches up on its next history fetch.
pub struct BroadcastDispatcher {
    registry: Arc<GroupChannelRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<GroupChannelRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to every connection attached to `group_id` at the
    /// moment of the call.
    ///
    /// The event is serialized once and sent sequentially, so each socket's
    /// own stream preserves broadcast order. A closed connection is skipped
    /// without failing delivery to the rest. Returns the number of
    /// connections reached.
    pub fn broadcast(&self, group_id: i64, event: &ChannelEvent) -> usize {
        let frame: Frame = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(err) => {
                tracing::error!(?err, group_id, "failed to serialize channel event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut skipped = 0;
        for connection in self.registry.connections_for(group_id) {
            if connection.send(frame.clone()) {
                delivered += 1;
            } else {
                // Receiver already gone; transport closure will detach it.
                skipped += 1;
            }
        }

        if skipped > 0 {
            tracing::debug!(group_id, skipped, "skipped closed connections during broadcast");
        }

        delivered
    }
}
