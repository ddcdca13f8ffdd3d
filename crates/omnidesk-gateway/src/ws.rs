// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket fanout of the live notification bus.
//!
//! Each connected front-end client receives every bus event as a JSON frame:
//!
//! ```json
//! {"event": "message:new", "data": {"contactId": "...", "message": {...}}}
//! {"event": "whatsapp:status", "data": {"status": "connected"}}
//! ```
//!
//! Delivery is fire-and-forget: a client that lags past the bus capacity
//! misses the oldest events and simply continues from there.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::server::GatewayState;

/// WebSocket upgrade handler for GET /ws.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut sender, mut receiver) = socket.split();
    let mut bus_rx = state.bus.subscribe();

    // Forward bus events until either side goes away.
    let forward = tokio::spawn(async move {
        loop {
            match bus_rx.recv().await {
                Ok(event) => {
                    let frame = event.to_frame().to_string();
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "ws subscriber lagged, continuing");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // The operator surface is read-only over this socket; drain frames until
    // the client closes.
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    forward.abort();
    debug!("ws client disconnected");
}
