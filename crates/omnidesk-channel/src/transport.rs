// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket transport to the channel bridge process.
//!
//! The bridge holds the actual connection to the chat network and speaks a
//! JSON protocol over a local websocket: one `login` frame from us, then a
//! stream of tagged [`ChannelEvent`] frames back and [`ChannelCommand`]
//! frames forward. Frames that fail to decode are logged and skipped, never
//! fatal.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use omnidesk_core::{ChannelEvent, ChannelTransport, DeskError, TransportLink};

/// Buffer sizes for the event/command channels.
const CHANNEL_BUFFER: usize = 256;

/// Opening frame sent to the bridge right after the websocket upgrade.
#[derive(Serialize)]
struct LoginFrame<'a> {
    command: &'static str,
    creds: Option<&'a serde_json::Value>,
}

/// Websocket client for a Baileys-style channel bridge.
pub struct BridgeTransport {
    url: String,
}

impl BridgeTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl ChannelTransport for BridgeTransport {
    async fn connect(
        &self,
        creds: Option<serde_json::Value>,
    ) -> Result<TransportLink, DeskError> {
        let (ws, _) = connect_async(&self.url).await.map_err(|e| DeskError::Channel {
            message: format!("bridge connect failed ({}): {e}", self.url),
            source: Some(Box::new(e)),
        })?;

        let (mut sink, mut stream) = ws.split();

        let login = serde_json::to_string(&LoginFrame {
            command: "login",
            creds: creds.as_ref(),
        })
        .map_err(|e| DeskError::Channel {
            message: format!("failed to encode login frame: {e}"),
            source: Some(Box::new(e)),
        })?;
        sink.send(Message::Text(login.into()))
            .await
            .map_err(|e| DeskError::Channel {
                message: format!("failed to send login frame: {e}"),
                source: Some(Box::new(e)),
            })?;

        let (events_tx, events_rx) = mpsc::channel::<ChannelEvent>(CHANNEL_BUFFER);
        let (commands_tx, mut commands_rx) = mpsc::channel(CHANNEL_BUFFER);

        // Reader: decode inbound frames into typed events. A websocket drop
        // without an explicit close event becomes a transient disconnect.
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ChannelEvent>(&text) {
                            Ok(event) => {
                                if events_tx.send(event).await.is_err() {
                                    debug!("event receiver dropped, stopping bridge reader");
                                    return;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "undecodable bridge frame, skipping");
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {} // Ignore binary/ping/pong.
                    Err(e) => {
                        warn!(error = %e, "bridge websocket error");
                        break;
                    }
                }
            }
            let _ = events_tx
                .send(ChannelEvent::Close {
                    reason: "transport closed".into(),
                    logged_out: false,
                })
                .await;
        });

        // Writer: encode outbound commands.
        tokio::spawn(async move {
            while let Some(command) = commands_rx.recv().await {
                let frame = match serde_json::to_string(&command) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "failed to encode command, skipping");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    warn!(error = %e, "bridge write failed, stopping writer");
                    break;
                }
            }
        });

        Ok(TransportLink {
            events: events_rx,
            commands: commands_tx,
        })
    }
}
