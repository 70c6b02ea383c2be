//! Presence tracking: which identity currently holds a live connection.
//!
//! [`PresenceTracker`] is the injected key-value seam; [`InMemoryPresence`]
//! is the single-process implementation. A distributed cache can replace it
//! as long as `upsert` and `remove_if_current` stay atomic.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, UserId};
use crate::error::GatewayError;

/// Identity → connection table with last-writer-wins registration.
#[async_trait]
pub trait PresenceTracker: Send + Sync + Debug {
    /// Records `conn_id` as the live connection of `user`, replacing any
    /// previous one. Returns the replaced connection.
    ///
    /// # Errors
    ///
    /// Implementation-specific backend failure.
    async fn upsert(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<Option<ConnectionId>, GatewayError>;

    /// Removes the entry of `user` only if it still points at `conn_id`.
    /// Returns `true` when an entry was removed.
    ///
    /// # Errors
    ///
    /// Implementation-specific backend failure.
    async fn remove_if_current(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<bool, GatewayError>;

    /// Live connection of `user`, if present.
    ///
    /// # Errors
    ///
    /// Implementation-specific backend failure.
    async fn lookup(&self, user: UserId) -> Result<Option<ConnectionId>, GatewayError>;
}

/// Process-local presence table.
#[derive(Debug, Default)]
pub struct InMemoryPresence {
    entries: RwLock<HashMap<UserId, ConnectionId>>,
}

impl InMemoryPresence {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users currently online.
    pub async fn online_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl PresenceTracker for InMemoryPresence {
    async fn upsert(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<Option<ConnectionId>, GatewayError> {
        Ok(self.entries.write().await.insert(user, conn_id))
    }

    async fn remove_if_current(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<bool, GatewayError> {
        let mut entries = self.entries.write().await;
        if entries.get(&user) == Some(&conn_id) {
            entries.remove(&user);
            return Ok(true);
        }
        Ok(false)
    }

    async fn lookup(&self, user: UserId) -> Result<Option<ConnectionId>, GatewayError> {
        Ok(self.entries.read().await.get(&user).copied())
    }
}
