// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket board and workflow endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use omnidesk_bus::BusEvent;
use omnidesk_core::{StorageAdapter, Ticket, TicketPatch};

use crate::error::ApiResult;
use crate::server::GatewayState;

/// GET /api/tickets -- board listing (open tickets plus recent closed).
pub async fn get_tickets(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(state.storage.board_tickets().await?))
}

/// Request body for POST /api/tickets/{id}/assign.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub user_id: String,
    #[serde(default)]
    pub department_id: Option<String>,
}

/// POST /api/tickets/{id}/assign -- an agent claims the ticket.
pub async fn post_assign(
    State(state): State<GatewayState>,
    Path(ticket_id): Path<String>,
    Json(body): Json<AssignRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .storage
        .assign_ticket(&ticket_id, &body.user_id, body.department_id.as_deref())
        .await?;
    state.bus.publish(BusEvent::TicketUpdate {
        ticket: ticket.clone(),
    });
    Ok(Json(ticket))
}

/// Request body for POST /api/tickets/{id}/close.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    #[serde(default)]
    pub closing_note: Option<String>,
}

/// POST /api/tickets/{id}/close
pub async fn post_close(
    State(state): State<GatewayState>,
    Path(ticket_id): Path<String>,
    Json(body): Json<CloseRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .storage
        .close_ticket(&ticket_id, body.closing_note.as_deref())
        .await?;
    state.bus.publish(BusEvent::TicketUpdate {
        ticket: ticket.clone(),
    });
    Ok(Json(ticket))
}

/// Request body for POST /api/tickets/{id}/transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default)]
    pub department_id: Option<String>,
}

/// POST /api/tickets/{id}/transfer -- back to the queue under a new
/// department, owner cleared.
pub async fn post_transfer(
    State(state): State<GatewayState>,
    Path(ticket_id): Path<String>,
    Json(body): Json<TransferRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ticket = state
        .storage
        .transfer_ticket(&ticket_id, body.department_id.as_deref())
        .await?;
    state.bus.publish(BusEvent::TicketUpdate { ticket });
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PUT /api/tickets/{id} -- generic partial update.
pub async fn put_ticket(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state.storage.update_ticket(&id, patch).await?;
    state.bus.publish(BusEvent::TicketUpdate {
        ticket: ticket.clone(),
    });
    Ok(Json(ticket))
}
