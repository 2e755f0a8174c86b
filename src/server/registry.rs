//! Live connection bookkeeping
//!
//! The `ConnectionRegistry` keeps one entry per accepted connection that has
//! not finished yet. Entries are added by the accept loop and removed by the
//! worker when it exits, through the [`ConnectionGuard`] it owns.
//!
//! # Thread Safety
//!
//! Backed by a `DashMap`; shared between tasks without a global lock.

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Connection identifier, unique for the lifetime of a server
pub type ConnectionId = u64;

/// Snapshot of one live connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Sequential id assigned at accept time
    pub id: ConnectionId,
    /// Remote address of the client
    pub peer: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
}

/// Concurrent map of live connections
#[derive(Debug)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, ConnectionInfo>,
}

/// Keeps a connection registered until dropped
#[derive(Debug)]
pub struct ConnectionGuard {
    registry: Arc<ConnectionRegistry>,
    id: ConnectionId,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: DashMap::new(),
        }
    }

    /// Register a freshly accepted connection
    ///
    /// # Returns
    ///
    /// A guard that removes the entry when dropped
    pub fn register(self: &Arc<Self>, peer: SocketAddr) -> ConnectionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.insert(
            id,
            ConnectionInfo {
                id,
                peer,
                connected_at: Instant::now(),
            },
        );

        ConnectionGuard {
            registry: Arc::clone(self),
            id,
        }
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is live
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Look up one connection
    pub fn get(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every live connection, ordered by id
    pub fn snapshot(&self) -> Vec<ConnectionInfo> {
        let mut connections: Vec<ConnectionInfo> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        connections.sort_by_key(|info| info.id);
        connections
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionGuard {
    /// Id of the guarded connection
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.connections.remove(&self.id);
    }
}
