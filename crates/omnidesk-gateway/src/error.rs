// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-HTTP mapping for the operator API.
//!
//! Channel unavailability is the operator's "disconnected" banner (503),
//! unknown ids are 404, everything else is a 500 with the error text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use omnidesk_core::DeskError;

/// Wrapper giving [`DeskError`] an HTTP rendering.
pub struct ApiError(pub DeskError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DeskError> for ApiError {
    fn from(err: DeskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DeskError::ChannelUnavailable | DeskError::Timeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DeskError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
