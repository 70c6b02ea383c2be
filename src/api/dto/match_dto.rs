//! Match list DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{MatchId, MatchRecord, ProfileSummary};
use crate::service::MatchView;

/// A match together with the other participant's profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    /// Match id, also the chat room key.
    pub match_id: MatchId,
    /// When the match was created.
    pub matched_at: DateTime<Utc>,
    /// `false` once unmatched.
    pub is_active: bool,
    /// The other participant.
    pub user: ProfileSummary,
}

impl From<MatchView> for MatchDto {
    fn from(view: MatchView) -> Self {
        Self {
            match_id: view.record.id,
            matched_at: view.record.matched_at,
            is_active: view.record.is_active,
            user: view.partner,
        }
    }
}

/// Response of `GET /api/matches`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchListResponse {
    /// Always `true`.
    pub success: bool,
    /// Number of entries in `matches`.
    pub count: usize,
    /// Active matches, most recent first.
    pub matches: Vec<MatchDto>,
}

/// Response of `GET /api/messages/matches`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchRecordListResponse {
    /// Always `true`.
    pub success: bool,
    /// Active match records, most recent first.
    pub matches: Vec<MatchRecord>,
}
