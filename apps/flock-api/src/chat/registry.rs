//! Group channel registry: which live connections want which group's pushes.
//!
//! Uses `DashMap` for shard-level concurrency and `parking_lot::Mutex` per
//! group entry for non-poisoning, fast locking. A connection belongs to at
//! most one group for its whole lifetime (one group per socket).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A pre-serialized frame queued for delivery to one connection.
pub type Frame = Arc<str>;

/// Handle to one live connection's outbound queue.
///
/// Cloning shares the queue; the WebSocket task drains the paired receiver
/// and the handle is dead once that receiver is dropped.
#[derive(Debug, Clone)]
pub struct GroupConnection {
    id: u64,
    tx: mpsc::UnboundedSender<Frame>,
}

impl GroupConnection {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a frame. Returns `false` if the connection is gone, which the
    /// dispatcher treats as "skip silently".
    pub fn send(&self, frame: Frame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Registry mapping group ids to the set of currently attached connections.
pub struct GroupChannelRegistry {
    next_id: AtomicU64,
    groups: DashMap<i64, Mutex<HashMap<u64, GroupConnection>>>,
}

impl GroupChannelRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            groups: DashMap::new(),
        }
    }

    /// Mint a connection handle and the receiver its socket task drains.
    pub fn channel(&self) -> (GroupConnection, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        (GroupConnection { id, tx }, rx)
    }

    /// Register `connection` under `group_id`.
    pub fn attach(&self, group_id: i64, connection: GroupConnection) {
        self.groups
            .entry(group_id)
            .or_insert_with(|| Mutex::new(HashMap::new()))
            .lock()
            .insert(connection.id, connection);
    }

    /// Remove a connection from a group's set.
    ///
    /// Idempotent: detaching a connection that is already absent is a no-op.
    pub fn detach(&self, group_id: i64, connection_id: u64) {
        if let Some(entry) = self.groups.get(&group_id) {
            entry.lock().remove(&connection_id);
        }
    }

    /// Snapshot of the current connections for `group_id` (empty if none).
    ///
    /// The dispatcher iterates the snapshot rather than the live map, so a
    /// concurrent detach cannot corrupt iteration.
    pub fn connections_for(&self, group_id: i64) -> Vec<GroupConnection> {
        match self.groups.get(&group_id) {
            Some(entry) => entry.lock().values().cloned().collect(),
            None => Vec::new(),
        }
    }
}

impl Default for GroupChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
