//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::auth::{bearer_token, verified_identity};
use crate::error::GatewayError;

/// Query string accepted by `/ws`.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Access token, for clients that cannot set headers on the upgrade.
    pub token: Option<String>,
}

/// `GET /ws` — Authenticate, then upgrade the HTTP connection to WebSocket.
///
/// The token is read from `?token=` first, then from the `Authorization`
/// header. Unauthenticated or unverified callers are refused before the
/// upgrade.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthenticated`] or [`GatewayError::Unverified`].
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, GatewayError> {
    let token = params.token.as_deref().or_else(|| bearer_token(&headers));
    let identity = verified_identity(state.authenticator.as_ref(), token).inspect_err(|e| {
        tracing::warn!(error = %e, "ws upgrade refused");
    })?;

    Ok(ws.on_upgrade(move |socket| run_connection(socket, identity, state)))
}
