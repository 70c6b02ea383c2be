//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single authenticated connection:
//! inbound frames are dispatched to the chat service one at a time, and
//! everything queued for the connection in the [`RoomRegistry`] is written
//! back in queue order.
//!
//! [`RoomRegistry`]: super::rooms::RoomRegistry

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::ClientEvent;
use crate::app_state::AppState;
use crate::auth::Identity;
use crate::domain::{ChatEvent, ConnectionId, MatchId, UserId};
use crate::error::GatewayError;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Registers the connection and announces the user to online partners.
/// - Reads client events and dispatches them.
/// - Forwards queued [`ChatEvent`]s to the client.
/// - On close, drops room membership and announces the user offline.
pub async fn run_connection(socket: WebSocket, identity: Identity, state: AppState) {
    let conn_id = ConnectionId::new();
    let user = identity.user_id;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    state.rooms.register(conn_id, user, event_tx).await;
    if let Err(e) = state.presence_service.connect(user, conn_id).await {
        tracing::error!(user_id = %user, %conn_id, error = %e, "presence registration failed");
    }
    tracing::info!(user_id = %user, %conn_id, "ws connection opened");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&state, conn_id, user, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%conn_id, error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event queued for this connection
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(%conn_id, event = event.event_name(), error = %e, "event serialization failed");
                    }
                }
            }
        }
    }

    state.rooms.unregister(conn_id).await;
    if let Err(e) = state.presence_service.disconnect(user, conn_id).await {
        tracing::error!(user_id = %user, %conn_id, error = %e, "presence removal failed");
    }
    tracing::info!(user_id = %user, %conn_id, "ws connection closed");
}

/// Parses and dispatches one text frame. Failures are reported to the
/// connection as an `error` event.
async fn handle_text_message(state: &AppState, conn_id: ConnectionId, user: UserId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "malformed client event");
            state
                .rooms
                .send_to(conn_id, ChatEvent::error("malformed event"))
                .await;
            return;
        }
    };

    let match_id = event.match_id();
    let (result, fallback) = match event {
        ClientEvent::JoinRoom { match_id } => (
            state
                .chat_service
                .join_room(conn_id, user, match_id)
                .await
                .map(drop),
            "failed to join room",
        ),
        ClientEvent::SendMessage { match_id, content } => (
            state
                .chat_service
                .send_message(user, match_id, &content)
                .await
                .map(drop),
            "failed to send message",
        ),
        ClientEvent::GetMessages {
            match_id,
            limit,
            skip,
        } => {
            let result = match state
                .chat_service
                .get_messages(user, match_id, limit, skip)
                .await
            {
                Ok(messages) => {
                    state
                        .rooms
                        .send_to(conn_id, ChatEvent::MessagesList(messages))
                        .await;
                    Ok(())
                }
                Err(e) => Err(e),
            };
            (result, "failed to get messages")
        }
        ClientEvent::MarkAsSeen {
            match_id,
            message_ids,
        } => (
            state
                .chat_service
                .mark_as_seen(Some(conn_id), user, match_id, message_ids)
                .await
                .map(drop),
            "failed to mark messages as seen",
        ),
    };

    if let Err(e) = result {
        report(state, conn_id, &e, fallback, match_id).await;
    }
}

async fn report(
    state: &AppState,
    conn_id: ConnectionId,
    err: &GatewayError,
    fallback: &str,
    match_id: MatchId,
) {
    if err.is_dependency_failure() {
        tracing::error!(%conn_id, %match_id, error = %err, "{fallback}");
    } else {
        tracing::debug!(%conn_id, %match_id, error = %err, "request rejected");
    }
    state
        .rooms
        .send_to(conn_id, ChatEvent::error(err.client_message(fallback)))
        .await;
}
