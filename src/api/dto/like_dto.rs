//! Like, super-like, pass and "likes you" DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MatchDto;
use crate::domain::{ProfileSummary, SwipeAction, UserId};
use crate::service::Liker;

/// Body of every swipe endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    /// User being swiped on.
    #[serde(default)]
    pub target_user_id: Option<UserId>,
}

/// Response of `POST /api/likes/send` and `POST /api/likes/super-like`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Always `true`.
    pub success: bool,
    /// `true` when the pair now has an active match.
    pub is_match: bool,
    /// Present (and `true`) on super-likes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_super_like: Option<bool>,
    /// Human-readable outcome.
    pub message: String,
    /// The match and the partner's profile, when `is_match` is set.
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchDto>,
}

/// One entry of the "likes you" list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeEntryDto {
    /// Liker.
    pub user_id: UserId,
    /// `like` or `superlike`.
    pub action: SwipeAction,
    /// When the like was recorded.
    pub liked_at: DateTime<Utc>,
    /// Liker's profile, if one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSummary>,
}

impl From<Liker> for LikeEntryDto {
    fn from(liker: Liker) -> Self {
        Self {
            user_id: liker.swipe.actor,
            action: liker.swipe.action,
            liked_at: liker.swipe.created_at,
            profile: liker.profile,
        }
    }
}

/// Response of `GET /api/likes/likes-you`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LikesYouResponse {
    /// Always `true`.
    pub success: bool,
    /// Number of entries in `likes`.
    pub count: usize,
    /// Likes, newest first.
    pub likes: Vec<LikeEntryDto>,
}
