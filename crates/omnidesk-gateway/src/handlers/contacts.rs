// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact and conversation-history endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use omnidesk_bus::BusEvent;
use omnidesk_core::{Contact, StoredMessage};

use crate::error::ApiResult;
use crate::server::GatewayState;

/// GET /api/contacts -- most recently active first.
pub async fn get_contacts(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Contact>>> {
    Ok(Json(state.storage.list_contacts().await?))
}

/// Request body for PUT /api/contacts/{id}.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// PUT /api/contacts/{id} -- operator rename.
pub async fn put_contact(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.storage.rename_contact(&id, &body.name).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/contacts/{id} -- cascades to messages and tickets. Ticket
/// deletions are announced on the bus so open boards drop them.
pub async fn delete_contact(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let ticket_ids = state.storage.ticket_ids_for_contact(&id).await?;
    state.storage.delete_contact(&id).await?;
    for ticket_id in ticket_ids {
        state.bus.publish(BusEvent::TicketDeleted { id: ticket_id });
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Request body for POST /api/contacts/{id}/toggle-ai.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAiRequest {
    pub is_ai_active: bool,
}

/// POST /api/contacts/{id}/toggle-ai -- flip the automation gate.
pub async fn post_toggle_ai(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<ToggleAiRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.storage.set_ai_enabled(&id, body.is_ai_active).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/messages/{contact_id} -- conversation in arrival order.
pub async fn get_messages(
    State(state): State<GatewayState>,
    Path(contact_id): Path<String>,
) -> ApiResult<Json<Vec<StoredMessage>>> {
    Ok(Json(state.storage.messages_for_contact(&contact_id).await?))
}

/// Request body for PUT /api/messages/{id}.
#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// PUT /api/messages/{id} -- operator content edit.
pub async fn put_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<EditMessageRequest>,
) -> ApiResult<Json<StoredMessage>> {
    Ok(Json(
        state.storage.update_message_content(&id, &body.content).await?,
    ))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.storage.delete_message(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
