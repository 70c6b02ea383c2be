//! Presence service: connection lifecycle and online/offline fan-out.

use std::sync::Arc;

use crate::domain::{ChatEvent, ConnectionId, UserId};
use crate::error::GatewayError;
use crate::persistence::MatchStore;
use crate::ws::presence::PresenceTracker;
use crate::ws::rooms::RoomRegistry;

/// Owns the presence table and tells matched partners when a user comes
/// and goes.
///
/// Only active matches count as partners.
#[derive(Debug, Clone)]
pub struct PresenceService {
    tracker: Arc<dyn PresenceTracker>,
    matches: Arc<dyn MatchStore>,
    rooms: Arc<RoomRegistry>,
}

impl PresenceService {
    /// Creates a new `PresenceService`.
    #[must_use]
    pub fn new(
        tracker: Arc<dyn PresenceTracker>,
        matches: Arc<dyn MatchStore>,
        rooms: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            tracker,
            matches,
            rooms,
        }
    }

    /// Registers `conn_id` as the live connection of `user`.
    ///
    /// Sends `matchOnline` to every online partner and `onlineMatches` to
    /// the new connection. Returns the online partners.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the presence table or the match store
    /// fails.
    pub async fn connect(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<Vec<UserId>, GatewayError> {
        if let Some(previous) = self.tracker.upsert(user, conn_id).await? {
            tracing::debug!(user_id = %user, %previous, "presence entry replaced");
        }

        let mut online = Vec::new();
        for partner in self.partners_of(user).await? {
            if let Some(partner_conn) = self.tracker.lookup(partner).await? {
                self.rooms
                    .send_to(partner_conn, ChatEvent::MatchOnline { user_id: user })
                    .await;
                online.push(partner);
            }
        }

        self.rooms
            .send_to(
                conn_id,
                ChatEvent::OnlineMatches {
                    users: online.clone(),
                },
            )
            .await;

        tracing::info!(user_id = %user, online_partners = online.len(), "user online");
        Ok(online)
    }

    /// Removes the presence entry of `user` if `conn_id` still owns it and
    /// sends `matchOffline` to every online partner. Returns the number of
    /// partners notified.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the presence table or the match store
    /// fails.
    pub async fn disconnect(
        &self,
        user: UserId,
        conn_id: ConnectionId,
    ) -> Result<usize, GatewayError> {
        if !self.tracker.remove_if_current(user, conn_id).await? {
            tracing::debug!(user_id = %user, "stale connection closed, presence untouched");
            return Ok(0);
        }

        let mut notified = 0;
        for partner in self.partners_of(user).await? {
            if let Some(partner_conn) = self.tracker.lookup(partner).await?
                && self
                    .rooms
                    .send_to(partner_conn, ChatEvent::MatchOffline { user_id: user })
                    .await
            {
                notified += 1;
            }
        }

        tracing::info!(user_id = %user, notified, "user offline");
        Ok(notified)
    }

    /// Pushes `event` to the live connection of `user`. Returns `false` when
    /// the user is offline.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the presence table fails.
    pub async fn notify_user(&self, user: UserId, event: ChatEvent) -> Result<bool, GatewayError> {
        match self.tracker.lookup(user).await? {
            Some(conn_id) => Ok(self.rooms.send_to(conn_id, event).await),
            None => Ok(false),
        }
    }

    async fn partners_of(&self, user: UserId) -> Result<Vec<UserId>, GatewayError> {
        Ok(self
            .matches
            .list_for_user(user)
            .await?
            .iter()
            .filter_map(|m| m.partner_of(user))
            .collect())
    }
}
