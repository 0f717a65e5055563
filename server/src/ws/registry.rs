//! Registry of live viewer connections.
//!
//! Shared between every connection session's teardown path and the
//! broadcast delivery task. Both sides may discover the same dead
//! connection, so removal is idempotent; fan-out iterates over a
//! point-in-time copy so it never holds registry locks across awaits.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::ConnectionSender;

/// Process-unique id for one viewer connection. Identity, not content:
/// a reconnecting viewer gets a fresh id and a fresh registry slot.
pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate the next connection id.
pub fn next_connection_id() -> ConnectionId {
    NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Thread-safe set of live viewer connections keyed by connection id.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<DashMap<ConnectionId, ConnectionSender>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound sender.
    pub fn add(&self, id: ConnectionId, sender: ConnectionSender) {
        self.inner.insert(id, sender);
    }

    /// Deregister a connection if present. Safe to call repeatedly and
    /// from multiple tasks; returns whether this call removed it.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.inner.remove(&id).is_some()
    }

    /// Point-in-time copy of the current membership, safe to iterate
    /// while the registry keeps mutating underneath.
    pub fn snapshot(&self) -> Vec<(ConnectionId, ConnectionSender)> {
        self.inner
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
