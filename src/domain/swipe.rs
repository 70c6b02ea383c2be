//! Swipe decisions and the ordered-pair ledger key.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// One-way decision a user makes about another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    /// Swipe right.
    Like,
    /// Swipe left (pass).
    Dislike,
    /// Swipe up.
    Superlike,
}

impl SwipeAction {
    /// Returns `true` for decisions that can complete a match.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Like | Self::Superlike)
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Superlike => "superlike",
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "superlike" => Ok(Self::Superlike),
            other => Err(format!("unknown swipe action: {other}")),
        }
    }
}

/// Directional ledger key. `(a, b)` and `(b, a)` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwipeKey {
    /// User who swiped.
    pub actor: UserId,
    /// User who was swiped on.
    pub target: UserId,
}

impl SwipeKey {
    /// Builds the key for `actor → target`.
    #[must_use]
    pub const fn new(actor: UserId, target: UserId) -> Self {
        Self { actor, target }
    }

    /// The key of the opposite direction, `target → actor`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            actor: self.target,
            target: self.actor,
        }
    }
}

/// Immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRecord {
    /// User who swiped.
    pub actor: UserId,
    /// User who was swiped on.
    pub target: UserId,
    /// The decision.
    pub action: SwipeAction,
    /// When the swipe was recorded.
    pub created_at: DateTime<Utc>,
}

impl SwipeRecord {
    /// Ledger key of this record.
    #[must_use]
    pub const fn key(&self) -> SwipeKey {
        SwipeKey::new(self.actor, self.target)
    }
}
