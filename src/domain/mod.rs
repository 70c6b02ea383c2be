//! Domain layer: identifiers, swipes, matches, messages and chat events.
//!
//! Swipes are keyed by the ordered pair [`SwipeKey`] while matches are keyed
//! by the canonical unordered [`PairKey`]; the two keys are kept as separate
//! types because their uniqueness rules differ.

pub mod chat_event;
pub mod ids;
pub mod match_record;
pub mod message;
pub mod profile;
pub mod swipe;

pub use chat_event::ChatEvent;
pub use ids::{ConnectionId, MatchId, MessageId, UserId};
pub use match_record::{MatchRecord, PairKey};
pub use message::{MessageRecord, NewMessage};
pub use profile::ProfileSummary;
pub use swipe::{SwipeAction, SwipeKey, SwipeRecord};
