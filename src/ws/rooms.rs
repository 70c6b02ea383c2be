//! Connection and room registry.
//!
//! [`RoomRegistry`] is the transport seam: it owns every live connection's
//! outbound queue and the mapping from match room to the set of bound
//! connections. Services address connections by [`ConnectionId`] and rooms
//! by [`MatchId`] only.

use std::collections::{HashMap, HashSet};

use tokio::sync::{RwLock, mpsc};

use crate::domain::{ChatEvent, ConnectionId, MatchId, UserId};

/// Outbound queue of one connection.
pub type EventSender = mpsc::UnboundedSender<ChatEvent>;

#[derive(Debug)]
struct ConnectionEntry {
    user_id: UserId,
    room: Option<MatchId>,
    sender: EventSender,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<MatchId, HashSet<ConnectionId>>,
}

impl RegistryInner {
    fn leave_current_room(&mut self, conn_id: ConnectionId) -> Option<MatchId> {
        let room = self.connections.get_mut(&conn_id)?.room.take()?;
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&conn_id);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
        Some(room)
    }
}

/// Process-wide table of connections and match rooms.
///
/// A connection is bound to at most one room; binding it to another room
/// moves it.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    pub async fn register(&self, conn_id: ConnectionId, user_id: UserId, sender: EventSender) {
        self.inner.write().await.connections.insert(
            conn_id,
            ConnectionEntry {
                user_id,
                room: None,
                sender,
            },
        );
    }

    /// Drops a connection and its room membership. Returns the room it was
    /// bound to, if any.
    pub async fn unregister(&self, conn_id: ConnectionId) -> Option<MatchId> {
        let mut inner = self.inner.write().await;
        let room = inner.leave_current_room(conn_id);
        inner.connections.remove(&conn_id);
        room
    }

    /// Binds `conn_id` to the room of `match_id`, leaving its previous room.
    /// Returns `false` when the connection is unknown.
    pub async fn join(&self, conn_id: ConnectionId, match_id: MatchId) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.connections.contains_key(&conn_id) {
            return false;
        }
        inner.leave_current_room(conn_id);
        inner.rooms.entry(match_id).or_default().insert(conn_id);
        if let Some(entry) = inner.connections.get_mut(&conn_id) {
            entry.room = Some(match_id);
        }
        true
    }

    /// Room the connection is currently bound to.
    pub async fn current_room(&self, conn_id: ConnectionId) -> Option<MatchId> {
        self.inner
            .read()
            .await
            .connections
            .get(&conn_id)
            .and_then(|entry| entry.room)
    }

    /// Queues `event` for one connection. Returns `false` if the connection
    /// is gone.
    pub async fn send_to(&self, conn_id: ConnectionId, event: ChatEvent) -> bool {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&conn_id)
            .is_some_and(|entry| entry.sender.send(event).is_ok())
    }

    /// Queues `event` for every connection bound to the room of `match_id`,
    /// optionally skipping one connection. Returns the number of recipients.
    pub async fn broadcast(
        &self,
        match_id: MatchId,
        event: &ChatEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(&match_id) else {
            return 0;
        };
        let mut delivered = 0;
        for conn_id in members.iter().filter(|id| Some(**id) != exclude) {
            let Some(entry) = inner.connections.get(conn_id) else {
                continue;
            };
            if entry.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(
                    %conn_id,
                    user_id = %entry.user_id,
                    %match_id,
                    "queue closed, event dropped"
                );
            }
        }
        delivered
    }

    /// Connections currently bound to the room of `match_id`.
    pub async fn room_members(&self, match_id: MatchId) -> Vec<ConnectionId> {
        self.inner
            .read()
            .await
            .rooms
            .get(&match_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn connect(registry: &RoomRegistry) -> (ConnectionId, mpsc::UnboundedReceiver<ChatEvent>) {
        let conn_id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(conn_id, UserId::new(), tx).await;
        (conn_id, rx)
    }

    #[tokio::test]
    async fn broadcast_reaches_room_members_only() {
        let registry = RoomRegistry::new();
        let (a, mut rx_a) = connect(&registry).await;
        let (b, mut rx_b) = connect(&registry).await;
        let (_outsider, mut rx_out) = connect(&registry).await;
        let room = MatchId::new();
        assert!(registry.join(a, room).await);
        assert!(registry.join(b, room).await);

        let event = ChatEvent::error("ping");
        assert_eq!(registry.broadcast(room, &event, None).await, 2);
        assert_eq!(rx_a.try_recv().ok(), Some(event.clone()));
        assert_eq!(rx_b.try_recv().ok(), Some(event));
        assert!(rx_out.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_can_exclude_the_caller() {
        let registry = RoomRegistry::new();
        let (a, mut rx_a) = connect(&registry).await;
        let (b, mut rx_b) = connect(&registry).await;
        let room = MatchId::new();
        registry.join(a, room).await;
        registry.join(b, room).await;

        assert_eq!(registry.broadcast(room, &ChatEvent::error("x"), Some(a)).await, 1);
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn joining_another_room_moves_the_connection() {
        let registry = RoomRegistry::new();
        let (a, _rx) = connect(&registry).await;
        let first = MatchId::new();
        let second = MatchId::new();
        registry.join(a, first).await;
        registry.join(a, second).await;

        assert_eq!(registry.current_room(a).await, Some(second));
        assert!(registry.room_members(first).await.is_empty());
        assert_eq!(registry.room_members(second).await, vec![a]);
    }

    #[tokio::test]
    async fn unregister_cleans_up_membership() {
        let registry = RoomRegistry::new();
        let (a, _rx) = connect(&registry).await;
        let room = MatchId::new();
        registry.join(a, room).await;

        assert_eq!(registry.unregister(a).await, Some(room));
        assert!(registry.room_members(room).await.is_empty());
        assert_eq!(registry.connection_count().await, 0);
        assert!(!registry.send_to(a, ChatEvent::error("gone")).await);
    }

    #[tokio::test]
    async fn unknown_connection_cannot_join() {
        let registry = RoomRegistry::new();
        assert!(!registry.join(ConnectionId::new(), MatchId::new()).await);
    }
}
