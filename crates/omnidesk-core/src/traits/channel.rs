// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel seams: the low-level transport the session manager drives, and
//! the narrow session capability everything else consumes.
//!
//! Only the session manager ever holds a [`TransportLink`]. The triage
//! pipeline and the operator gateway see the connection exclusively through
//! [`ChannelSession`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DeskError;
use crate::types::{ChannelCommand, ChannelEvent, ChannelStatus, MediaKind, PresenceState};

/// A live duplex connection produced by a [`ChannelTransport`].
///
/// Dropping the link tears the underlying connection down.
pub struct TransportLink {
    /// Decoded events from the chat network. The stream ends when the
    /// connection closes.
    pub events: mpsc::Receiver<ChannelEvent>,
    /// Outbound commands toward the chat network.
    pub commands: mpsc::Sender<ChannelCommand>,
}

/// Factory for connections to the external chat network.
///
/// One handshake may be in flight at a time; the session manager enforces
/// this and tags each attempt with an epoch.
#[async_trait]
pub trait ChannelTransport: Send + Sync + 'static {
    /// Opens a connection, resuming from the persisted credential blob when
    /// one is supplied. Without credentials the remote side is expected to
    /// issue a pairing challenge ([`ChannelEvent::Qr`]).
    async fn connect(
        &self,
        creds: Option<serde_json::Value>,
    ) -> Result<TransportLink, DeskError>;
}

/// The send/status capability exposed by the session manager.
#[async_trait]
pub trait ChannelSession: Send + Sync + 'static {
    /// Snapshot of the connection state and any pending pairing challenge.
    fn status(&self) -> ChannelStatus;

    /// Sends a text message. Fails with [`DeskError::ChannelUnavailable`]
    /// unless the session is connected.
    async fn send_text(&self, contact_id: &str, text: &str) -> Result<(), DeskError>;

    /// Sends a media message referencing a locally stored file.
    async fn send_media(
        &self,
        contact_id: &str,
        kind: MediaKind,
        path: &str,
        caption: Option<&str>,
    ) -> Result<(), DeskError>;

    /// Sends a presence update (typing indicator and friends). Best-effort.
    async fn send_presence(
        &self,
        contact_id: &str,
        state: PresenceState,
    ) -> Result<(), DeskError>;

    /// Best-effort remote logout, then tears the session down as a terminal
    /// disconnect.
    async fn logout(&self) -> Result<(), DeskError>;

    /// Forcibly discards the stored session and requests a fresh pairing
    /// challenge.
    async fn reset(&self) -> Result<(), DeskError>;
}
