//! Type-safe identifiers.
//!
//! Every identifier is a newtype around [`uuid::Uuid`] so that a user id
//! can never be passed where a match id is expected. Users come from the
//! authentication collaborator; matches, messages and connections are
//! generated server-side as UUID v4.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Opaque user identity as issued by the authentication collaborator.
    ///
    /// `Ord` follows UUID byte order, which is also the lexicographic order
    /// of the lowercase hyphenated string. [`super::PairKey`] relies on it.
    UserId
);

define_id!(
    /// Identifier of a [`super::MatchRecord`]. Also names the chat room.
    MatchId
);

define_id!(
    /// Identifier of a [`super::MessageRecord`].
    MessageId
);

define_id!(
    /// Identifier of one live WebSocket connection.
    ///
    /// This is the connection handle stored in presence entries and room
    /// membership sets.
    ConnectionId
);
