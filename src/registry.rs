//! Presence registry: user identity -> active WebSocket connection.
//!
//! In-memory only; restart loses all registrations. Registrations are
//! unauthenticated and last-write-wins by design: any client may claim
//! any identity, and a later claim silently displaces the earlier one.

use dashmap::DashMap;
use std::sync::Arc;

use crate::ws::{ConnectionId, ConnectionSender};

/// A live registration: the connection currently answering for an identity.
#[derive(Clone)]
pub struct RegistryEntry {
    pub conn_id: ConnectionId,
    pub tx: ConnectionSender,
}

/// Maps registered identities to their live connections.
///
/// At most one entry per identity. A single connection may hold entries
/// under several identities (re-registering with a new identity on the
/// same connection adds an independent entry).
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<DashMap<String, RegistryEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Bind `identity` to a connection, overwriting any previous binding.
    /// The displaced connection is not notified.
    pub fn register(&self, identity: &str, conn_id: ConnectionId, tx: ConnectionSender) {
        self.entries
            .insert(identity.to_string(), RegistryEntry { conn_id, tx });
    }

    /// The connection currently registered under `identity`, if any.
    pub fn lookup(&self, identity: &str) -> Option<RegistryEntry> {
        self.entries.get(identity).map(|e| e.value().clone())
    }

    /// Drop every identity bound to `conn_id`. No-op when none are;
    /// safe to call more than once for the same connection.
    pub fn remove_by_handle(&self, conn_id: ConnectionId) {
        self.entries.retain(|_, entry| entry.conn_id != conn_id);
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sender() -> ConnectionSender {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn register_then_lookup_returns_handle() {
        let registry = Registry::new();
        registry.register("alice", 1, sender());

        let entry = registry.lookup("alice").expect("alice should be registered");
        assert_eq!(entry.conn_id, 1);
    }

    #[test]
    fn lookup_unknown_identity_is_absent() {
        let registry = Registry::new();
        assert!(registry.lookup("nobody").is_none());
    }

    #[test]
    fn re_registration_overwrites_previous_handle() {
        let registry = Registry::new();
        registry.register("alice", 1, sender());
        registry.register("alice", 2, sender());

        let entry = registry.lookup("alice").unwrap();
        assert_eq!(entry.conn_id, 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_by_handle_clears_all_matching_entries() {
        let registry = Registry::new();
        registry.register("alice", 1, sender());
        registry.register("alice-work", 1, sender());
        registry.register("bob", 2, sender());

        registry.remove_by_handle(1);

        assert!(registry.lookup("alice").is_none());
        assert!(registry.lookup("alice-work").is_none());
        assert_eq!(registry.lookup("bob").unwrap().conn_id, 2);
    }

    #[test]
    fn remove_by_handle_is_idempotent() {
        let registry = Registry::new();
        registry.register("alice", 1, sender());

        registry.remove_by_handle(1);
        registry.remove_by_handle(1);

        assert!(registry.is_empty());
    }

    #[test]
    fn remove_unknown_handle_is_a_noop() {
        let registry = Registry::new();
        registry.register("alice", 1, sender());

        registry.remove_by_handle(99);

        assert_eq!(registry.len(), 1);
    }
}
