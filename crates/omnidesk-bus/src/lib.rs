// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live notification bus for the OmniDesk support desk.
//!
//! Core components publish named state-change events; connected observers
//! (front-end clients via the gateway websocket) receive them fan-out style.
//! Delivery is fire-and-forget: there is no acknowledgment, and subscribers
//! that lag past the channel capacity lose the oldest events.

use omnidesk_core::{ConnectionState, StoredMessage, Ticket};
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the broadcast channel backing the bus.
const BUS_CAPACITY: usize = 256;

/// A named state-change event published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// A message was persisted for a contact (inbound or outbound).
    MessageNew {
        contact_id: String,
        message: StoredMessage,
    },
    /// A ticket was created or changed.
    TicketUpdate { ticket: Ticket },
    /// A ticket was deleted.
    TicketDeleted { id: String },
    /// The channel connection state changed.
    ChannelStatus { status: ConnectionState },
    /// A fresh pairing challenge was issued.
    ChannelQr { qr: String },
    /// A contact is composing a message.
    Typing { contact_id: String },
    /// Delivery receipt for an outbound message (3=sent, 4=delivered, 5=read).
    MessageStatus { id: String, status: i64 },
}

impl BusEvent {
    /// The wire name of the event, as consumed by front-end observers.
    pub fn name(&self) -> &'static str {
        match self {
            BusEvent::MessageNew { .. } => "message:new",
            BusEvent::TicketUpdate { .. } | BusEvent::TicketDeleted { .. } => "ticket:update",
            BusEvent::ChannelStatus { .. } => "whatsapp:status",
            BusEvent::ChannelQr { .. } => "whatsapp:qr",
            BusEvent::Typing { .. } => "chat:typing",
            BusEvent::MessageStatus { .. } => "message:status",
        }
    }

    /// Serializes the event to the `{event, data}` frame sent over the
    /// gateway websocket.
    pub fn to_frame(&self) -> serde_json::Value {
        let data = match self {
            BusEvent::MessageNew {
                contact_id,
                message,
            } => serde_json::json!({ "contactId": contact_id, "message": message }),
            BusEvent::TicketUpdate { ticket } => serde_json::json!({ "ticket": ticket }),
            BusEvent::TicketDeleted { id } => {
                serde_json::json!({ "id": id, "deleted": true })
            }
            BusEvent::ChannelStatus { status } => serde_json::json!({ "status": status }),
            BusEvent::ChannelQr { qr } => serde_json::json!(qr),
            BusEvent::Typing { contact_id } => serde_json::json!({ "contactId": contact_id }),
            BusEvent::MessageStatus { id, status } => {
                serde_json::json!({ "id": id, "status": status })
            }
        };

        serde_json::json!({ "event": self.name(), "data": data })
    }
}

/// Fan-out bus over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publishes an event to all current subscribers. Publishing with no
    /// subscribers is not an error.
    pub fn publish(&self, event: BusEvent) {
        trace!(event = event.name(), "bus publish");
        let _ = self.tx.send(event);
    }

    /// Subscribes to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
