//! Chat service: authorization, room binding, message log and fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::chat_event::room_name;
use crate::domain::message::validate_content;
use crate::domain::{
    ChatEvent, ConnectionId, MatchId, MatchRecord, MessageId, MessageRecord, NewMessage, UserId,
};
use crate::error::GatewayError;
use crate::persistence::{MatchStore, MessageStore};
use crate::ws::rooms::RoomRegistry;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Routes chat operations for match rooms.
///
/// Every operation first checks that the caller participates in an active
/// match. Appends to one match are serialized with a per-room lock held
/// across the append and the broadcast, so every room member observes
/// `newMessage` events in log order.
#[derive(Debug)]
pub struct ChatService {
    matches: Arc<dyn MatchStore>,
    messages: Arc<dyn MessageStore>,
    rooms: Arc<RoomRegistry>,
    send_locks: Mutex<HashMap<MatchId, Arc<Mutex<()>>>>,
}

impl ChatService {
    /// Creates a new `ChatService`.
    #[must_use]
    pub fn new(
        matches: Arc<dyn MatchStore>,
        messages: Arc<dyn MessageStore>,
        rooms: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            matches,
            messages,
            rooms,
            send_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the active match `match_id` if `user` participates in it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] when the match is unknown,
    /// inactive or foreign to `user`.
    pub async fn authorize(
        &self,
        match_id: MatchId,
        user: UserId,
    ) -> Result<MatchRecord, GatewayError> {
        match self
            .matches
            .find_active_for_participant(match_id, user)
            .await?
        {
            Some(record) => Ok(record),
            None => {
                tracing::warn!(%match_id, user_id = %user, "unauthorized match access");
                Err(GatewayError::Unauthorized)
            }
        }
    }

    /// Binds `conn_id` to the room of `match_id`, then sends `joinedRoom`
    /// and the latest messages (oldest first) to that connection only.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] when the caller may not access
    /// the match, or a dependency failure.
    pub async fn join_room(
        &self,
        conn_id: ConnectionId,
        user: UserId,
        match_id: MatchId,
    ) -> Result<Vec<MessageRecord>, GatewayError> {
        self.authorize(match_id, user).await?;
        if !self.rooms.join(conn_id, match_id).await {
            return Err(GatewayError::Internal(format!(
                "connection {conn_id} is not registered"
            )));
        }

        self.rooms
            .send_to(
                conn_id,
                ChatEvent::JoinedRoom {
                    match_id,
                    room_name: room_name(match_id),
                },
            )
            .await;

        let history = self.oldest_first(match_id, DEFAULT_PAGE_LIMIT, 0).await?;
        self.rooms
            .send_to(conn_id, ChatEvent::MessagesList(history.clone()))
            .await;

        tracing::debug!(%match_id, user_id = %user, %conn_id, history = history.len(), "joined room");
        Ok(history)
    }

    /// Validates, stores and broadcasts a message to every connection in
    /// the room, sender included.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for blank or oversized
    /// content, [`GatewayError::Unauthorized`] when the caller may not
    /// access the match, or a dependency failure.
    pub async fn send_message(
        &self,
        user: UserId,
        match_id: MatchId,
        content: &str,
    ) -> Result<MessageRecord, GatewayError> {
        let content = validate_content(content)?;
        let record = self.authorize(match_id, user).await?;
        let receiver_id = record.partner_of(user).ok_or(GatewayError::Unauthorized)?;

        let room_lock = self.room_lock(match_id).await;
        let appended = {
            let _guard = room_lock.lock().await;
            self.append_and_broadcast(NewMessage {
                match_id,
                sender_id: user,
                receiver_id,
                content,
            })
            .await
        };
        self.release_room_lock(match_id, room_lock).await;
        appended
    }

    /// Returns a page of messages, oldest first. `limit` defaults to
    /// [`DEFAULT_PAGE_LIMIT`] and is clamped to `1..=MAX_PAGE_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] when the caller may not access
    /// the match, or a dependency failure.
    pub async fn get_messages(
        &self,
        user: UserId,
        match_id: MatchId,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<MessageRecord>, GatewayError> {
        self.authorize(match_id, user).await?;
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        self.oldest_first(match_id, limit, skip.unwrap_or(0)).await
    }

    /// Flags the given messages addressed to `user` as seen and broadcasts
    /// `messagesSeen` to the rest of the room. Returns the number of
    /// messages that changed state.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an empty id list,
    /// [`GatewayError::Unauthorized`] when the caller may not access the
    /// match, or a dependency failure.
    pub async fn mark_as_seen(
        &self,
        origin: Option<ConnectionId>,
        user: UserId,
        match_id: MatchId,
        message_ids: Vec<MessageId>,
    ) -> Result<u64, GatewayError> {
        if message_ids.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "messageIds must not be empty".to_string(),
            ));
        }
        self.authorize(match_id, user).await?;

        let changed = self.messages.mark_seen(&message_ids, match_id, user).await?;
        self.rooms
            .broadcast(
                match_id,
                &ChatEvent::MessagesSeen {
                    match_id,
                    message_ids,
                },
                origin,
            )
            .await;

        tracing::debug!(%match_id, user_id = %user, changed, "messages seen");
        Ok(changed)
    }

    async fn oldest_first(
        &self,
        match_id: MatchId,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<MessageRecord>, GatewayError> {
        let mut page = self.messages.page(match_id, limit, skip).await?;
        page.reverse();
        Ok(page)
    }

    async fn append_and_broadcast(
        &self,
        message: NewMessage,
    ) -> Result<MessageRecord, GatewayError> {
        let match_id = message.match_id;
        let message = self.messages.append(message).await?;
        let delivered = self
            .rooms
            .broadcast(match_id, &ChatEvent::NewMessage(message.clone()), None)
            .await;

        tracing::debug!(%match_id, message_id = %message.id, delivered, "message appended");
        Ok(message)
    }

    async fn room_lock(&self, match_id: MatchId) -> Arc<Mutex<()>> {
        let mut locks = self.send_locks.lock().await;
        Arc::clone(locks.entry(match_id).or_default())
    }

    /// Drops the caller's handle and evicts the room lock once nobody else
    /// holds or waits on it. Handles are only cloned under the map lock.
    async fn release_room_lock(&self, match_id: MatchId, lock: Arc<Mutex<()>>) {
        let mut locks = self.send_locks.lock().await;
        drop(lock);
        if locks
            .get(&match_id)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            locks.remove(&match_id);
        }
    }
}
