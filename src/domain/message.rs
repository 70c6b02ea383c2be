//! Chat messages exchanged inside a match.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{MatchId, MessageId, UserId};
use crate::error::GatewayError;

/// Maximum message length in characters (not bytes).
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Append-only message row. Only `seen` ever changes after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Server-assigned identifier.
    pub id: MessageId,
    /// Match the message belongs to.
    pub match_id: MatchId,
    /// Author.
    pub sender_id: UserId,
    /// The other participant of the match.
    pub receiver_id: UserId,
    /// Message body, trimmed.
    pub content: String,
    /// Set once the receiver acknowledged the message.
    pub seen: bool,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Message about to be appended; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Target match.
    pub match_id: MatchId,
    /// Author.
    pub sender_id: UserId,
    /// Other participant.
    pub receiver_id: UserId,
    /// Validated body.
    pub content: String,
}

impl NewMessage {
    /// Turns this draft into a stored record.
    #[must_use]
    pub fn into_record(self, id: MessageId, created_at: DateTime<Utc>) -> MessageRecord {
        MessageRecord {
            id,
            match_id: self.match_id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            seen: false,
            created_at,
        }
    }
}

/// Validates raw message content and returns the text to store.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] when the content is blank or
/// longer than [`MAX_CONTENT_CHARS`] characters.
pub fn validate_content(raw: &str) -> Result<String, GatewayError> {
    if raw.chars().count() > MAX_CONTENT_CHARS {
        return Err(GatewayError::InvalidRequest(format!(
            "content must be at most {MAX_CONTENT_CHARS} characters"
        )));
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "content is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn exactly_max_length_is_accepted() {
        let content = "a".repeat(MAX_CONTENT_CHARS);
        let Ok(stored) = validate_content(&content) else {
            panic!("1000 characters must be accepted");
        };
        assert_eq!(stored.len(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn one_over_max_length_is_rejected() {
        let content = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(
            validate_content(&content),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let content = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&content).is_ok());
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(validate_content("").is_err());
        assert!(validate_content("   \n").is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(validate_content("  hi  ").ok().as_deref(), Some("hi"));
    }
}
