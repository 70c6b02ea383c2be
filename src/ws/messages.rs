//! Client → server WebSocket frames.
//!
//! Frames share the `{"event": "<name>", "data": {...}}` envelope of
//! [`crate::domain::ChatEvent`].

use serde::Deserialize;

use crate::domain::{MatchId, MessageId};

/// Request sent by a client over its WebSocket connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a match room.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        /// Room to join.
        match_id: MatchId,
    },
    /// Post a message to a match.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        /// Target match.
        match_id: MatchId,
        /// Raw message body.
        content: String,
    },
    /// Fetch a page of history.
    #[serde(rename_all = "camelCase")]
    GetMessages {
        /// Target match.
        match_id: MatchId,
        /// Page size.
        #[serde(default)]
        limit: Option<u32>,
        /// Messages to skip from the newest.
        #[serde(default)]
        skip: Option<u32>,
    },
    /// Acknowledge received messages.
    #[serde(rename_all = "camelCase")]
    MarkAsSeen {
        /// Target match.
        match_id: MatchId,
        /// Messages to flag.
        message_ids: Vec<MessageId>,
    },
}

impl ClientEvent {
    /// Match the request targets.
    #[must_use]
    pub const fn match_id(&self) -> MatchId {
        match self {
            Self::JoinRoom { match_id }
            | Self::SendMessage { match_id, .. }
            | Self::GetMessages { match_id, .. }
            | Self::MarkAsSeen { match_id, .. } => *match_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_message() {
        let id = MatchId::new();
        let raw = format!(
            r#"{{"event":"sendMessage","data":{{"matchId":"{id}","content":"hi"}}}}"#
        );
        let Ok(event) = serde_json::from_str::<ClientEvent>(&raw) else {
            panic!("frame should parse");
        };
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                match_id: id,
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn get_messages_paging_is_optional() {
        let id = MatchId::new();
        let raw = format!(r#"{{"event":"getMessages","data":{{"matchId":"{id}"}}}}"#);
        let Ok(ClientEvent::GetMessages { limit, skip, .. }) =
            serde_json::from_str::<ClientEvent>(&raw)
        else {
            panic!("frame should parse");
        };
        assert_eq!((limit, skip), (None, None));
    }

    #[test]
    fn unknown_event_is_rejected() {
        let raw = r#"{"event":"subscribe","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn mark_as_seen_reads_id_list() {
        let (mid, a, b) = (MatchId::new(), MessageId::new(), MessageId::new());
        let raw = format!(
            r#"{{"event":"markAsSeen","data":{{"matchId":"{mid}","messageIds":["{a}","{b}"]}}}}"#
        );
        let Ok(event) = serde_json::from_str::<ClientEvent>(&raw) else {
            panic!("frame should parse");
        };
        assert_eq!(event.match_id(), mid);
        assert!(matches!(event, ClientEvent::MarkAsSeen { message_ids, .. } if message_ids == vec![a, b]));
    }
}
