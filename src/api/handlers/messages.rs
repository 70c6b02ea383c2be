//! Chat history handlers.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{MatchRecordListResponse, MessageListResponse, PaginationParams};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::MatchId;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/messages/matches` — Active match records of the caller.
///
/// # Errors
///
/// Returns [`GatewayError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/messages/matches",
    tag = "Messages",
    summary = "List chat rooms",
    description = "Returns the caller's active match records, most recent first.",
    responses(
        (status = 200, description = "Active match records", body = MatchRecordListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<MatchRecordListResponse>, GatewayError> {
    let matches = state.match_service.matches_for(me.user_id).await?;
    Ok(Json(MatchRecordListResponse {
        success: true,
        matches,
    }))
}

/// `GET /api/messages/messages/{matchId}` — One page of chat history.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a malformed id or paging
/// parameter and [`GatewayError::Unauthorized`] when the caller is not a
/// participant of the active match.
#[utoipa::path(
    get,
    path = "/api/messages/messages/{match_id}",
    tag = "Messages",
    summary = "Get chat history",
    description = "Returns up to `limit` messages after skipping the `skip` newest, ordered oldest first.",
    params(
        ("match_id" = uuid::Uuid, Path, description = "Match UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Message page", body = MessageListResponse),
        (status = 400, description = "Malformed match id, limit or skip", body = ErrorResponse),
        (status = 403, description = "Not a participant of an active match", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_messages(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    id: Result<Path<uuid::Uuid>, PathRejection>,
    page: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<MessageListResponse>, GatewayError> {
    let Path(id) = id.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let Query(page) = page.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let match_id = MatchId::from_uuid(id);
    let messages = state
        .chat_service
        .get_messages(me.user_id, match_id, page.limit, page.skip)
        .await?;
    Ok(Json(MessageListResponse {
        success: true,
        messages,
    }))
}

/// Chat history routes, mounted under `/api/messages`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matches", get(list_rooms))
        .route("/messages/{match_id}", get(get_messages))
}
