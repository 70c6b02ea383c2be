//! # rendezvous-gateway
//!
//! Swipe-to-match and real-time chat gateway for a dating application.
//!
//! A like or super-like is recorded in the swipe ledger; when the other user
//! already liked back, exactly one match record is created for the pair.
//! Matched users chat over WebSocket rooms keyed by match id, with presence
//! notifications when a partner connects or disconnects.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── MatchService / ChatService / PresenceService (service/)
//!     ├── RoomRegistry / PresenceTracker (ws/)
//!     │
//!     └── SwipeLedger / MatchStore / MessageStore / ProfileDirectory
//!         (persistence/: in-memory or PostgreSQL)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
