//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Acknowledgement body for endpoints without a payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl SuccessResponse {
    /// Builds a successful acknowledgement.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Offset pagination over a newest-first message log.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page size, 1 to 100. Defaults to 50.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Messages to skip from the newest. Defaults to 0.
    #[serde(default)]
    pub skip: Option<u32>,
}
