//! REST endpoint handlers organized by resource.

pub mod likes;
pub mod matches;
pub mod messages;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes; mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/likes", likes::routes())
        .nest("/matches", matches::routes())
        .nest("/messages", messages::routes())
}
