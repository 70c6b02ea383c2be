//! WebSocket layer: connection handling, room routing, presence.
//!
//! The WebSocket endpoint at `/ws` carries chat traffic for match rooms
//! and pushes presence and match notifications.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod presence;
pub mod rooms;
