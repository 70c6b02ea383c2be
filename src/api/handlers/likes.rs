//! Swipe handlers: like, super-like, pass, and the "likes you" list.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    LikeEntryDto, LikeRequest, LikeResponse, LikesYouResponse, MatchDto, SuccessResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{SwipeAction, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/likes/send` — Like a user.
///
/// # Errors
///
/// Returns [`GatewayError`] for a missing or self target, a repeated swipe,
/// or a storage failure.
#[utoipa::path(
    post,
    path = "/api/likes/send",
    tag = "Likes",
    summary = "Like a user",
    description = "Records a like. When the target already liked the caller, the pair's match is created or returned.",
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Like recorded", body = LikeResponse),
        (status = 400, description = "Missing target, self like, or already swiped", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn send_like(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<Json<LikeResponse>, GatewayError> {
    let target = target_of(payload)?;
    like_response(&state, me.user_id, target, SwipeAction::Like)
        .await
        .map(Json)
}

/// `POST /api/likes/super-like` — Super-like a user.
///
/// # Errors
///
/// Returns [`GatewayError`] for a missing or self target, a repeated swipe,
/// or a storage failure.
#[utoipa::path(
    post,
    path = "/api/likes/super-like",
    tag = "Likes",
    summary = "Super-like a user",
    description = "Same as a like, flagged as a super-like.",
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Super-like recorded", body = LikeResponse),
        (status = 400, description = "Missing target, self like, or already swiped", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn send_super_like(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<Json<LikeResponse>, GatewayError> {
    let target = target_of(payload)?;
    like_response(&state, me.user_id, target, SwipeAction::Superlike)
        .await
        .map(Json)
}

/// `POST /api/likes/pass` — Pass on a user.
///
/// # Errors
///
/// Returns [`GatewayError`] for a missing or self target, a repeated swipe,
/// or a storage failure.
#[utoipa::path(
    post,
    path = "/api/likes/pass",
    tag = "Likes",
    summary = "Pass on a user",
    description = "Records a dislike. Never creates a match.",
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Pass recorded", body = SuccessResponse),
        (status = 400, description = "Missing target, self pass, or already swiped", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn pass(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, GatewayError> {
    let target = target_of(payload)?;
    state
        .match_service
        .swipe(me.user_id, target, SwipeAction::Dislike)
        .await?;
    Ok(Json(SuccessResponse::new("Profile passed")))
}

/// `GET /api/likes/likes-you` — Users who liked the caller.
///
/// # Errors
///
/// Returns [`GatewayError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/likes/likes-you",
    tag = "Likes",
    summary = "List incoming likes",
    description = "Returns every like and super-like the caller received, newest first, with the liker's profile when available.",
    responses(
        (status = 200, description = "Incoming likes", body = LikesYouResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn likes_you(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<LikesYouResponse>, GatewayError> {
    let likes: Vec<LikeEntryDto> = state
        .match_service
        .likes_you(me.user_id)
        .await?
        .into_iter()
        .map(LikeEntryDto::from)
        .collect();
    Ok(Json(LikesYouResponse {
        success: true,
        count: likes.len(),
        likes,
    }))
}

fn target_of(payload: Result<Json<LikeRequest>, JsonRejection>) -> Result<UserId, GatewayError> {
    let Json(request) =
        payload.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    request
        .target_user_id
        .ok_or_else(|| GatewayError::InvalidRequest("target user id is required".to_string()))
}

async fn like_response(
    state: &AppState,
    me: UserId,
    target: UserId,
    action: SwipeAction,
) -> Result<LikeResponse, GatewayError> {
    let outcome = state.match_service.swipe(me, target, action).await?;
    let match_info = match outcome.active_match() {
        Some(record) => Some(MatchDto::from(
            state.match_service.view_of(record.clone(), me).await?,
        )),
        None => None,
    };

    let super_like = action == SwipeAction::Superlike;
    let message = match (&match_info, super_like) {
        (Some(_), _) => "It's a match!",
        (None, true) => "Super like sent successfully",
        (None, false) => "Like sent successfully",
    };

    Ok(LikeResponse {
        success: true,
        is_match: match_info.is_some(),
        is_super_like: super_like.then_some(true),
        message: message.to_string(),
        match_info,
    })
}

/// Swipe routes, mounted under `/api/likes`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_like))
        .route("/super-like", post(send_super_like))
        .route("/pass", post(pass))
        .route("/likes-you", get(likes_you))
}
