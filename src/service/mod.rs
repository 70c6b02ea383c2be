//! Service layer: business logic orchestration.
//!
//! [`MatchService`] turns swipes into matches, [`ChatService`] routes room
//! traffic and [`PresenceService`] owns the connection lifecycle. Each one
//! receives its stores and the [`crate::ws::rooms::RoomRegistry`] by
//! injection.

pub mod chat_service;
pub mod match_service;
pub mod presence_service;

pub use chat_service::ChatService;
pub use match_service::{Liker, MatchService, MatchView, Resolution, SwipeOutcome};
pub use presence_service::PresenceService;
