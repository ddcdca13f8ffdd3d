// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator file uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use omnidesk_core::MediaStore;

use crate::error::{ApiError, ApiResult};
use crate::server::GatewayState;

/// POST /api/upload -- multipart file upload into the media store.
///
/// Returns the static reference for the stored file. The body size limit is
/// enforced by the router layer.
pub async fn post_upload(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError(omnidesk_core::DeskError::Media {
            message: format!("invalid multipart body: {e}"),
            source: Some(Box::new(e)),
        })
    })? {
        let Some(original_name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| {
            ApiError(omnidesk_core::DeskError::Media {
                message: format!("failed to read upload: {e}"),
                source: Some(Box::new(e)),
            })
        })?;

        let name = format!("{}_{original_name}", chrono::Utc::now().timestamp_millis());
        let url = state.media.save(&bytes, &name).await?;
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "url": url, "filename": name })),
        ));
    }

    Ok((
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "Nenhum arquivo enviado" })),
    ))
}
