//! Match records and the canonical unordered pair key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{MatchId, UserId};

/// Canonical key for an unordered user pair.
///
/// `low < high` always holds, so `{a, b}` and `{b, a}` produce the same key.
/// The two users must be distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    /// Builds the canonical key, or `None` when both ids are the same user.
    #[must_use]
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Smaller participant id.
    #[must_use]
    pub const fn low(&self) -> UserId {
        self.low
    }

    /// Larger participant id.
    #[must_use]
    pub const fn high(&self) -> UserId {
        self.high
    }
}

/// One record per matched pair; `is_active` is cleared on unmatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Match identifier, also the chat room key.
    pub id: MatchId,
    /// Canonically smaller participant.
    pub user_low: UserId,
    /// Canonically larger participant.
    pub user_high: UserId,
    /// `false` once either participant unmatched.
    pub is_active: bool,
    /// When the mutual like was detected.
    pub matched_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Creates a fresh active match for `pair`.
    #[must_use]
    pub fn new(pair: PairKey) -> Self {
        Self {
            id: MatchId::new(),
            user_low: pair.low(),
            user_high: pair.high(),
            is_active: true,
            matched_at: Utc::now(),
        }
    }

    /// Canonical pair key of this record.
    #[must_use]
    pub const fn pair(&self) -> PairKey {
        PairKey {
            low: self.user_low,
            high: self.user_high,
        }
    }

    /// Returns `true` if `user` is one of the two participants.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.user_low == user || self.user_high == user
    }

    /// The other participant, or `None` when `user` is not part of this match.
    #[must_use]
    pub fn partner_of(&self, user: UserId) -> Option<UserId> {
        if self.user_low == user {
            Some(self.user_high)
        } else if self.user_high == user {
            Some(self.user_low)
        } else {
            None
        }
    }
}
