//! Message history DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::MessageRecord;

/// Response of `GET /api/messages/messages/{matchId}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageListResponse {
    /// Always `true`.
    pub success: bool,
    /// One page of messages, oldest first.
    pub messages: Vec<MessageRecord>,
}
