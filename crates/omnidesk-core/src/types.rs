// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across component traits and the OmniDesk workspace.
//!
//! Wire-facing enums decode the channel bridge's tagged JSON at the boundary;
//! everything past the router works with these typed shapes, never raw blobs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies the type of component in the plugin registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Storage,
    Provider,
    MediaStore,
}

/// Health status reported by component health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Component is fully operational.
    Healthy,
    /// Component is operational but experiencing issues.
    Degraded(String),
    /// Component is not operational.
    Unhealthy(String),
}

// --- Channel connection types ---

/// Connection state of the channel session. Exactly one instance exists,
/// owned by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Snapshot of the session manager's externally visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub status: ConnectionState,
    /// Pending pairing challenge, present only while connecting without a
    /// stored session.
    pub qr: Option<String>,
}

/// Presence sub-states relayed by the chat network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Composing,
    Paused,
    Available,
    Unavailable,
}

// --- Wire event/command types ---

/// Media descriptor attached to an inbound wire message. The `url` resolves
/// through the bridge while the originating connection is alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMedia {
    pub kind: MediaKind,
    pub mime_type: String,
    pub url: String,
}

/// A conversational message as decoded off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// External message identifier assigned by the chat network.
    pub id: String,
    /// Stable external address of the remote participant.
    pub contact_id: String,
    /// Display name advertised by the sender, when present.
    #[serde(default)]
    pub push_name: Option<String>,
    /// True for echoes of the desk's own sends.
    #[serde(default)]
    pub from_me: bool,
    /// Plain text body or media caption.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<InboundMedia>,
}

/// Events emitted by the channel transport, decoded at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// A fresh pairing challenge to be scanned by the operator.
    Qr { code: String },
    /// Refreshed credential state to persist.
    Creds { blob: serde_json::Value },
    /// Handshake completed; the session is live.
    Open,
    /// The connection dropped. `logged_out` marks a terminal rejection by
    /// the remote network; anything else is transient.
    Close { reason: String, logged_out: bool },
    Message(InboundMessage),
    Presence {
        contact_id: String,
        state: PresenceState,
    },
    /// Delivery receipt for an outbound message (3=sent, 4=delivered, 5=read).
    Receipt { message_id: String, status: i64 },
}

/// Commands accepted by the channel transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ChannelCommand {
    SendText {
        contact_id: String,
        text: String,
    },
    SendMedia {
        contact_id: String,
        kind: MediaKind,
        path: String,
        #[serde(default)]
        caption: Option<String>,
    },
    Presence {
        contact_id: String,
        state: PresenceState,
    },
    Logout,
}

// --- Persisted entity types ---

/// Classification of message content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Text,
    Image,
    Audio,
    Document,
}

/// A remote chat participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// External channel address (stable identifier).
    pub id: String,
    pub name: String,
    /// Automation gate: when false, the assistant never replies.
    pub ai_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub contact_id: String,
    pub content: String,
    /// Direction: true when sent by the desk.
    pub from_me: bool,
    /// Origin: true when generated by the assistant.
    pub from_assistant: bool,
    pub media_kind: MediaKind,
    pub media_url: Option<String>,
    pub created_at: String,
}

/// Field set for creating a message row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub contact_id: String,
    pub content: String,
    pub from_me: bool,
    pub from_assistant: bool,
    pub media_kind: MediaKind,
    pub media_url: Option<String>,
}

/// Lifecycle state of a ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Queued,
    InProgress,
    Closed,
}

/// A trackable case derived from a triaged conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub contact_id: String,
    pub department_id: Option<String>,
    /// Owner. Non-null if and only if status is `in_progress`.
    pub assigned_to: Option<String>,
    pub title: String,
    pub priority: String,
    pub status: TicketStatus,
    /// The parsed handoff report, stored as opaque JSON.
    pub summary: Option<serde_json::Value>,
    pub closing_note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Field set for creating a ticket row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub contact_id: String,
    pub title: String,
    pub priority: String,
    pub status: TicketStatus,
    pub summary: Option<serde_json::Value>,
}

/// Partial update for a ticket row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub title: Option<String>,
    pub priority: Option<String>,
    pub status: Option<TicketStatus>,
    pub department_id: Option<String>,
    pub closing_note: Option<String>,
}
