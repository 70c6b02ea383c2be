//! Server → client events pushed over WebSocket connections.
//!
//! Every event serializes as `{"event": "<name>", "data": <payload>}`.

use serde::Serialize;

use super::{MatchId, MatchRecord, MessageId, MessageRecord, UserId};

/// Event delivered to one connection or fanned out to a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ChatEvent {
    /// The connection is now bound to the match room.
    #[serde(rename_all = "camelCase")]
    JoinedRoom {
        /// Joined match.
        match_id: MatchId,
        /// Room name (`match_<id>`).
        room_name: String,
    },

    /// A page of messages, oldest first.
    MessagesList(Vec<MessageRecord>),

    /// A message appended to the room's match.
    NewMessage(MessageRecord),

    /// The receiver acknowledged messages.
    #[serde(rename_all = "camelCase")]
    MessagesSeen {
        /// Match the messages belong to.
        match_id: MatchId,
        /// Acknowledged message ids as sent by the receiver.
        message_ids: Vec<MessageId>,
    },

    /// A matched partner connected.
    #[serde(rename_all = "camelCase")]
    MatchOnline {
        /// Partner who came online.
        user_id: UserId,
    },

    /// A matched partner disconnected.
    #[serde(rename_all = "camelCase")]
    MatchOffline {
        /// Partner who went offline.
        user_id: UserId,
    },

    /// Partners online at the moment this connection was registered.
    OnlineMatches {
        /// Online partner ids.
        users: Vec<UserId>,
    },

    /// A mutual like just created a match.
    NewMatch(MatchRecord),

    /// A request on this connection failed. The connection stays open.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ChatEvent {
    /// Builds an [`ChatEvent::Error`] event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JoinedRoom { .. } => "joinedRoom",
            Self::MessagesList(_) => "messagesList",
            Self::NewMessage(_) => "newMessage",
            Self::MessagesSeen { .. } => "messagesSeen",
            Self::MatchOnline { .. } => "matchOnline",
            Self::MatchOffline { .. } => "matchOffline",
            Self::OnlineMatches { .. } => "onlineMatches",
            Self::NewMatch(_) => "newMatch",
            Self::Error { .. } => "error",
        }
    }
}

/// Room name for a match.
#[must_use]
pub fn room_name(match_id: MatchId) -> String {
    format!("match_{match_id}")
}
