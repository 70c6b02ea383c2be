//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! WebSocket handlers reuse [`GatewayError::client_message`] for the
//! `error` event payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::MatchId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "message": "you already swiped on this person",
///   "code": 2002
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub message: String,
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                 |
/// |-----------|------------------|-----------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request             |
/// | 2000–2999 | State/Not Found  | 400 / 404                   |
/// | 3000–3999 | Server           | 500 Internal Server Error   |
/// | 4000–4999 | Auth/Access      | 401 / 403                   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The swipe targets the acting user.
    #[error("you can't swipe on yourself")]
    InvalidTarget,

    /// The actor already swiped on the target.
    #[error("you already swiped on this person")]
    DuplicateSwipe,

    /// Match with the given id does not exist.
    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    /// Missing, malformed, or expired credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The identity exists but has not completed verification.
    #[error("account not verified")]
    Unverified,

    /// The caller is not a participant of an active match with that id.
    /// Deliberately does not reveal whether the match exists.
    #[error("unauthorized match or match not found")]
    Unauthorized,

    /// The caller is not a participant of the referenced match.
    #[error("you are not part of this match")]
    Forbidden,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTarget => 1002,
            Self::MatchNotFound(_) => 2001,
            Self::DuplicateSwipe => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unauthenticated(_) => 4001,
            Self::Unverified => 4002,
            Self::Unauthorized => 4003,
            Self::Forbidden => 4004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTarget | Self::DuplicateSwipe => {
                StatusCode::BAD_REQUEST
            }
            Self::MatchNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Unverified | Self::Unauthorized | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for failures of a dependency rather than of the request.
    #[must_use]
    pub const fn is_dependency_failure(&self) -> bool {
        matches!(self, Self::PersistenceError(_) | Self::Internal(_))
    }

    /// Message safe to show to the client. Dependency failures are replaced
    /// by `fallback` so internals never leak.
    #[must_use]
    pub fn client_message(&self, fallback: &str) -> String {
        if self.is_dependency_failure() {
            fallback.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_dependency_failure() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            success: false,
            code: self.error_code(),
            message: self.client_message("internal server error"),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
