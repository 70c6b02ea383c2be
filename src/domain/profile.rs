//! Read-only profile summary supplied by the profile collaborator.

use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;

/// Public profile fields shown next to matches and likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    /// Profile owner.
    pub user_id: UserId,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Free-form location text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Occupation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    /// Short biography.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileSummary {
    /// Summary carrying only the user id.
    #[must_use]
    pub fn bare(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}
