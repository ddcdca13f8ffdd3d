// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel lifecycle endpoints and manual agent messaging.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use omnidesk_bus::BusEvent;
use omnidesk_core::{
    ChannelStatus, DeskError, MediaKind, MediaStore, NewMessage, PresenceState, StorageAdapter,
};

use crate::error::ApiResult;
use crate::server::GatewayState;

/// GET /api/whatsapp/status
pub async fn get_status(State(state): State<GatewayState>) -> Json<ChannelStatus> {
    Json(state.channel.status())
}

/// POST /api/whatsapp/logout
pub async fn post_logout(State(state): State<GatewayState>) -> ApiResult<Json<serde_json::Value>> {
    state.channel.logout().await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/whatsapp/reset
pub async fn post_reset(State(state): State<GatewayState>) -> ApiResult<Json<serde_json::Value>> {
    state.channel.reset().await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Request body for POST /api/send.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub contact_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaKind>,
}

/// POST /api/send -- manual message from a human agent.
///
/// Sends through the channel session first; only a delivered message is
/// persisted. 503 when the channel is unavailable.
pub async fn post_send(
    State(state): State<GatewayState>,
    Json(body): Json<SendRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let text = body.text.unwrap_or_default();

    let (content, media_kind, media_url) = match (&body.media_url, body.media_type) {
        (Some(media_url), Some(kind)) => {
            let path = state.media.resolve(media_url).ok_or(DeskError::NotFound {
                entity: "media",
                id: media_url.clone(),
            })?;
            state
                .channel
                .send_media(
                    &body.contact_id,
                    kind,
                    &path.to_string_lossy(),
                    (!text.is_empty()).then_some(text.as_str()),
                )
                .await?;
            let content = if !text.is_empty() {
                text.clone()
            } else if kind == MediaKind::Audio {
                "Áudio enviado".to_string()
            } else {
                "Arquivo enviado".to_string()
            };
            (content, kind, Some(media_url.clone()))
        }
        _ => {
            state.channel.send_text(&body.contact_id, &text).await?;
            (text.clone(), MediaKind::Text, None)
        }
    };

    let message = state
        .storage
        .insert_message(NewMessage {
            contact_id: body.contact_id.clone(),
            content,
            from_me: true,
            from_assistant: false,
            media_kind,
            media_url,
        })
        .await?;

    state.bus.publish(BusEvent::MessageNew {
        contact_id: body.contact_id,
        message,
    });

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Request body for POST /api/typing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRequest {
    pub contact_id: String,
}

/// POST /api/typing -- show the contact a composing indicator, auto-paused
/// after three seconds.
pub async fn post_typing(
    State(state): State<GatewayState>,
    Json(body): Json<TypingRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .channel
        .send_presence(&body.contact_id, PresenceState::Composing)
        .await?;

    let channel = state.channel.clone();
    let contact_id = body.contact_id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        if let Err(e) = channel.send_presence(&contact_id, PresenceState::Paused).await {
            debug!(error = %e, "paused presence not delivered");
        }
    });

    Ok(Json(serde_json::json!({ "success": true })))
}
