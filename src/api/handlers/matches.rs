//! Match handlers: list and unmatch.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{MatchDto, MatchListResponse, SuccessResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::MatchId;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/matches` — Active matches of the caller.
///
/// # Errors
///
/// Returns [`GatewayError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/matches",
    tag = "Matches",
    summary = "List matches",
    description = "Returns the caller's active matches, most recent first, each with the partner's profile.",
    responses(
        (status = 200, description = "Active matches", body = MatchListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_matches(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<MatchListResponse>, GatewayError> {
    let matches: Vec<MatchDto> = state
        .match_service
        .match_views(me.user_id)
        .await?
        .into_iter()
        .map(MatchDto::from)
        .collect();
    Ok(Json(MatchListResponse {
        success: true,
        count: matches.len(),
        matches,
    }))
}

/// `DELETE /api/matches/{matchId}` — Unmatch.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a malformed id,
/// [`GatewayError::MatchNotFound`] for an unknown id and
/// [`GatewayError::Forbidden`] when the caller is not a participant.
#[utoipa::path(
    delete,
    path = "/api/matches/{match_id}",
    tag = "Matches",
    summary = "Unmatch",
    description = "Deactivates the match. The record is kept and the pair can no longer chat.",
    params(
        ("match_id" = uuid::Uuid, Path, description = "Match UUID"),
    ),
    responses(
        (status = 200, description = "Match deactivated", body = SuccessResponse),
        (status = 400, description = "Malformed match id", body = ErrorResponse),
        (status = 403, description = "Caller is not part of the match", body = ErrorResponse),
        (status = 404, description = "Match not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn unmatch(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    id: Result<Path<uuid::Uuid>, PathRejection>,
) -> Result<Json<SuccessResponse>, GatewayError> {
    let Path(id) = id.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let match_id = MatchId::from_uuid(id);
    state.match_service.unmatch(match_id, me.user_id).await?;
    Ok(Json(SuccessResponse::new("Unmatched successfully")))
}

/// Match routes, mounted under `/api/matches`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matches))
        .route("/{match_id}", delete(unmatch))
}
