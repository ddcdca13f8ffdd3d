// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The channel session manager.
//!
//! Owns the single process-wide connection to the chat network: connect,
//! resume or pair via scannable challenge, persist refreshed credentials,
//! reconnect on transient drops with capped backoff, and perform a full
//! reset when the remote network revokes the session.
//!
//! Every handshake attempt is tagged with an epoch. `reset()` (and
//! `logout()`) bump the epoch before touching session storage, so late
//! callbacks from a superseded handshake are ignored rather than racing the
//! new one. At most one handshake is in flight per epoch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use omnidesk_bus::{BusEvent, EventBus};
use omnidesk_config::model::ChannelConfig;
use omnidesk_core::{
    AdapterType, ChannelCommand, ChannelEvent, ChannelSession, ChannelStatus, ChannelTransport,
    ConnectionState, DeskError, HealthStatus, MediaKind, PluginAdapter, PresenceState,
    TransportLink,
};

use crate::backoff::Backoff;

/// Filename of the persisted credential blob inside the session directory.
const CREDS_FILE: &str = "creds.json";

/// Buffer for events forwarded to the inbound router.
const FORWARD_BUFFER: usize = 256;

/// Outcome of consuming one live connection's event stream.
enum Pump {
    /// Remote revoked the session; wipe storage and pair fresh.
    Terminal,
    /// Any other drop; reconnect with existing credentials.
    Transient,
}

struct LinkState {
    connection: ConnectionState,
    qr: Option<String>,
    commands: Option<mpsc::Sender<ChannelCommand>>,
}

struct Inner {
    transport: Arc<dyn ChannelTransport>,
    bus: EventBus,
    session_dir: PathBuf,
    send_timeout: Duration,
    backoff_base: Duration,
    backoff_cap: Duration,
    reset_grace: Duration,
    /// Handshake generation counter. Loops for a superseded epoch exit at
    /// the next check instead of mutating shared state.
    epoch: AtomicU64,
    /// Wakes superseded loops parked on a quiet connection so they drop
    /// their link immediately.
    cancel: tokio::sync::Notify,
    state: Mutex<LinkState>,
    events_tx: mpsc::Sender<ChannelEvent>,
}

/// Cheap clonable handle to the single channel session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Builds the manager. The returned receiver carries conversational
    /// events (message, presence, receipt) for the inbound router;
    /// connection-lifecycle events are consumed here and never forwarded.
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        config: &ChannelConfig,
        bus: EventBus,
    ) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::channel(FORWARD_BUFFER);
        let manager = Self {
            inner: Arc::new(Inner {
                transport,
                bus,
                session_dir: PathBuf::from(&config.session_dir),
                send_timeout: Duration::from_secs(config.send_timeout_secs),
                backoff_base: Duration::from_millis(config.backoff_base_ms),
                backoff_cap: Duration::from_millis(config.backoff_cap_ms),
                reset_grace: Duration::from_millis(config.reset_grace_ms),
                epoch: AtomicU64::new(0),
                cancel: tokio::sync::Notify::new(),
                state: Mutex::new(LinkState {
                    connection: ConnectionState::Disconnected,
                    qr: None,
                    commands: None,
                }),
                events_tx,
            }),
        };
        (manager, events_rx)
    }

    /// Starts (or restarts) the connection loop. Reconnection from here on
    /// is automatic; callers only invoke this again after a `reset()`, which
    /// does it itself.
    pub fn start(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        info!(epoch, "starting channel session");
        tokio::spawn(async move {
            run_loop(inner, epoch).await;
        });
    }

    /// Current handshake generation. Strictly increases across
    /// start/reset/logout.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    async fn send_command(&self, command: ChannelCommand) -> Result<(), DeskError> {
        let tx = {
            let state = self.inner.state.lock().expect("state lock poisoned");
            if state.connection != ConnectionState::Connected {
                return Err(DeskError::ChannelUnavailable);
            }
            state.commands.clone().ok_or(DeskError::ChannelUnavailable)?
        };

        tokio::time::timeout(self.inner.send_timeout, tx.send(command))
            .await
            .map_err(|_| DeskError::Timeout {
                duration: self.inner.send_timeout,
            })?
            .map_err(|_| DeskError::ChannelUnavailable)
    }
}

#[async_trait]
impl ChannelSession for SessionManager {
    fn status(&self) -> ChannelStatus {
        let state = self.inner.state.lock().expect("state lock poisoned");
        ChannelStatus {
            status: state.connection,
            qr: state.qr.clone(),
        }
    }

    async fn send_text(&self, contact_id: &str, text: &str) -> Result<(), DeskError> {
        self.send_command(ChannelCommand::SendText {
            contact_id: contact_id.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_media(
        &self,
        contact_id: &str,
        kind: MediaKind,
        path: &str,
        caption: Option<&str>,
    ) -> Result<(), DeskError> {
        self.send_command(ChannelCommand::SendMedia {
            contact_id: contact_id.to_string(),
            kind,
            path: path.to_string(),
            caption: caption.map(|c| c.to_string()),
        })
        .await
    }

    async fn send_presence(
        &self,
        contact_id: &str,
        state: PresenceState,
    ) -> Result<(), DeskError> {
        self.send_command(ChannelCommand::Presence {
            contact_id: contact_id.to_string(),
            state,
        })
        .await
    }

    async fn logout(&self) -> Result<(), DeskError> {
        // Best-effort remote notification, then terminal-disconnect handling.
        let tx = {
            let state = self.inner.state.lock().expect("state lock poisoned");
            state.commands.clone()
        };
        if let Some(tx) = tx
            && tx.send(ChannelCommand::Logout).await.is_err()
        {
            debug!("logout notify failed, connection already gone");
        }
        self.reset().await
    }

    async fn reset(&self) -> Result<(), DeskError> {
        // Supersede any in-flight handshake before touching session storage,
        // and wake parked loops so they drop their connection now.
        let superseded = self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel.notify_waiters();
        info!(superseded, "resetting channel session");

        {
            let mut state = self.inner.state.lock().expect("state lock poisoned");
            state.connection = ConnectionState::Disconnected;
            state.qr = None;
            state.commands = None;
        }
        self.inner.bus.publish(BusEvent::ChannelStatus {
            status: ConnectionState::Disconnected,
        });

        // Grace window so the torn-down handshake releases any handles on
        // the session directory before it is deleted.
        tokio::time::sleep(self.inner.reset_grace).await;
        wipe_session(&self.inner).await?;

        self.start();
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SessionManager {
    fn name(&self) -> &str {
        "channel-session"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskError> {
        let status = self.status();
        Ok(match status.status {
            ConnectionState::Connected => HealthStatus::Healthy,
            ConnectionState::Connecting => {
                HealthStatus::Degraded("handshake in progress".into())
            }
            ConnectionState::Disconnected => HealthStatus::Unhealthy("disconnected".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), DeskError> {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel.notify_waiters();
        let mut state = self.inner.state.lock().expect("state lock poisoned");
        state.connection = ConnectionState::Disconnected;
        state.commands = None;
        Ok(())
    }
}

fn is_current(inner: &Inner, epoch: u64) -> bool {
    inner.epoch.load(Ordering::SeqCst) == epoch
}

/// Mutates shared state and publishes the new status, unless the calling
/// loop has been superseded.
fn transition(inner: &Inner, epoch: u64, connection: ConnectionState, qr: Option<String>) -> bool {
    if !is_current(inner, epoch) {
        return false;
    }
    {
        let mut state = inner.state.lock().expect("state lock poisoned");
        state.connection = connection;
        state.qr = qr;
        if connection == ConnectionState::Disconnected {
            state.commands = None;
        }
    }
    inner.bus.publish(BusEvent::ChannelStatus { status: connection });
    true
}

async fn run_loop(inner: Arc<Inner>, epoch: u64) {
    let mut backoff = Backoff::new(inner.backoff_base, inner.backoff_cap);

    loop {
        if !is_current(&inner, epoch) {
            return;
        }

        transition(&inner, epoch, ConnectionState::Connecting, None);

        let creds = load_creds(&inner).await;
        let resuming = creds.is_some();
        debug!(epoch, resuming, "opening channel transport");

        let link = match inner.transport.connect(creds).await {
            Ok(link) => link,
            Err(e) => {
                if !is_current(&inner, epoch) {
                    return;
                }
                let delay = backoff.next_delay();
                warn!(error = %e, ?delay, "transport connect failed, retrying");
                transition(&inner, epoch, ConnectionState::Disconnected, None);
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        if !is_current(&inner, epoch) {
            // A reset superseded this handshake; dropping the link tears the
            // connection down.
            return;
        }

        {
            let mut state = inner.state.lock().expect("state lock poisoned");
            state.commands = Some(link.commands.clone());
        }

        let outcome = pump_events(&inner, epoch, link, &mut backoff).await;

        if !is_current(&inner, epoch) {
            return;
        }

        match outcome {
            Pump::Terminal => {
                info!("session revoked by remote network, wiping stored credentials");
                if let Err(e) = wipe_session(&inner).await {
                    warn!(error = %e, "failed to wipe session storage");
                }
                backoff.reset();
            }
            Pump::Transient => {
                let delay = backoff.next_delay();
                debug!(?delay, "transient disconnect, reconnecting");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Consumes one connection's event stream until it closes.
async fn pump_events(
    inner: &Arc<Inner>,
    epoch: u64,
    mut link: TransportLink,
    backoff: &mut Backoff,
) -> Pump {
    loop {
        let event = tokio::select! {
            event = link.events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = inner.cancel.notified() => {
                if !is_current(inner, epoch) {
                    return Pump::Transient;
                }
                continue;
            }
        };
        if !is_current(inner, epoch) {
            return Pump::Transient;
        }
        match event {
            ChannelEvent::Qr { code } => {
                info!("pairing challenge received");
                if transition(inner, epoch, ConnectionState::Connecting, Some(code.clone())) {
                    inner.bus.publish(BusEvent::ChannelQr { qr: code });
                }
            }
            ChannelEvent::Creds { blob } => {
                if let Err(e) = store_creds(inner, &blob).await {
                    warn!(error = %e, "failed to persist refreshed credentials");
                }
            }
            ChannelEvent::Open => {
                info!("channel connected");
                transition(inner, epoch, ConnectionState::Connected, None);
                backoff.reset();
            }
            ChannelEvent::Close { reason, logged_out } => {
                warn!(reason = %reason, logged_out, "channel connection closed");
                transition(inner, epoch, ConnectionState::Disconnected, None);
                return if logged_out {
                    Pump::Terminal
                } else {
                    Pump::Transient
                };
            }
            conversational @ (ChannelEvent::Message(_)
            | ChannelEvent::Presence { .. }
            | ChannelEvent::Receipt { .. }) => {
                if inner.events_tx.send(conversational).await.is_err() {
                    warn!("inbound router dropped, discarding event");
                }
            }
        }
    }

    // Stream ended without an explicit close frame.
    transition(inner, epoch, ConnectionState::Disconnected, None);
    Pump::Transient
}

async fn load_creds(inner: &Inner) -> Option<serde_json::Value> {
    let path = inner.session_dir.join(CREDS_FILE);
    let bytes = tokio::fs::read(&path).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "unreadable credential blob, ignoring");
            None
        }
    }
}

async fn store_creds(inner: &Inner, blob: &serde_json::Value) -> Result<(), DeskError> {
    tokio::fs::create_dir_all(&inner.session_dir)
        .await
        .map_err(|e| DeskError::Channel {
            message: format!("failed to create session dir: {e}"),
            source: Some(Box::new(e)),
        })?;
    let path = inner.session_dir.join(CREDS_FILE);
    let bytes = serde_json::to_vec(blob).map_err(|e| DeskError::Channel {
        message: format!("failed to encode credentials: {e}"),
        source: Some(Box::new(e)),
    })?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| DeskError::Channel {
            message: format!("failed to write credentials: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Removes the session directory as a unit. Missing storage is fine.
async fn wipe_session(inner: &Inner) -> Result<(), DeskError> {
    match tokio::fs::remove_dir_all(&inner.session_dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DeskError::Channel {
            message: format!("failed to remove session dir: {e}"),
            source: Some(Box::new(e)),
        }),
    }
}
