// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fakes for pipeline and dispatcher tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use omnidesk_core::{
    AdapterType, Assistant, ChannelSession, ChannelStatus, ConnectionState, Contact, DeskError,
    HealthStatus, MediaKind, NewMessage, NewTicket, PluginAdapter, PresenceState, StorageAdapter,
    StoredMessage, Ticket, TicketPatch,
};

/// Storage fake: in-memory vectors plus a switchable automation flag.
pub struct FakeStorage {
    ai_enabled: AtomicBool,
    contacts: Mutex<Vec<Contact>>,
    messages: Mutex<Vec<StoredMessage>>,
    tickets: Mutex<Vec<Ticket>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self {
            ai_enabled: AtomicBool::new(true),
            contacts: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            tickets: Mutex::new(Vec::new()),
        }
    }

    pub fn set_ai_enabled(&self, enabled: bool) {
        self.ai_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<StoredMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets.lock().unwrap().clone()
    }

    pub fn contact_names(&self) -> Vec<String> {
        self.contacts.lock().unwrap().iter().map(|c| c.name.clone()).collect()
    }
}

#[async_trait]
impl PluginAdapter for FakeStorage {
    fn name(&self) -> &str {
        "fake-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FakeStorage {
    async fn initialize(&self) -> Result<(), DeskError> {
        Ok(())
    }

    async fn upsert_contact(&self, id: &str, name: &str) -> Result<Contact, DeskError> {
        let mut contacts = self.contacts.lock().unwrap();
        let now = "2026-01-01T00:00:00Z".to_string();
        if let Some(existing) = contacts.iter_mut().find(|c| c.id == id) {
            existing.ai_enabled = self.ai_enabled.load(Ordering::SeqCst);
            return Ok(existing.clone());
        }
        let contact = Contact {
            id: id.to_string(),
            name: name.to_string(),
            ai_enabled: self.ai_enabled.load(Ordering::SeqCst),
            created_at: now.clone(),
            updated_at: now,
        };
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn insert_message(&self, msg: NewMessage) -> Result<StoredMessage, DeskError> {
        let stored = StoredMessage {
            id: format!("msg-{}", self.messages.lock().unwrap().len()),
            contact_id: msg.contact_id,
            content: msg.content,
            from_me: msg.from_me,
            from_assistant: msg.from_assistant,
            media_kind: msg.media_kind,
            media_url: msg.media_url,
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        self.messages.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DeskError> {
        let stored = Ticket {
            id: format!("ticket-{}", self.tickets.lock().unwrap().len()),
            contact_id: ticket.contact_id,
            department_id: None,
            assigned_to: None,
            title: ticket.title,
            priority: ticket.priority,
            status: ticket.status,
            summary: ticket.summary,
            closing_note: None,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        };
        self.tickets.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_ticket(&self, id: &str, _patch: TicketPatch) -> Result<Ticket, DeskError> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound {
                entity: "ticket",
                id: id.to_string(),
            })
    }
}

/// Assistant fake: scripted reply, optional artificial latency, call log.
pub struct FakeAssistant {
    reply: Mutex<String>,
    delay: Mutex<Duration>,
    calls: Mutex<Vec<(String, Option<PathBuf>)>>,
}

impl FakeAssistant {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Mutex::new(reply.to_string()),
            delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn media_paths(&self) -> Vec<Option<PathBuf>> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl Assistant for FakeAssistant {
    async fn generate(
        &self,
        text: &str,
        _conversation_id: &str,
        media_path: Option<&Path>,
    ) -> String {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), media_path.map(|p| p.to_path_buf())));
        self.reply.lock().unwrap().clone()
    }
}

/// Channel fake: records sends, can be switched to fail them.
pub struct FakeChannel {
    fail_sends: AtomicBool,
    sent: Mutex<Vec<(String, String)>>,
    presences: Mutex<Vec<String>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            fail_sends: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            presences: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn presences(&self) -> Vec<String> {
        self.presences.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSession for FakeChannel {
    fn status(&self) -> ChannelStatus {
        ChannelStatus {
            status: if self.fail_sends.load(Ordering::SeqCst) {
                ConnectionState::Disconnected
            } else {
                ConnectionState::Connected
            },
            qr: None,
        }
    }

    async fn send_text(&self, contact_id: &str, text: &str) -> Result<(), DeskError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeskError::ChannelUnavailable);
        }
        self.sent
            .lock()
            .unwrap()
            .push((contact_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_media(
        &self,
        contact_id: &str,
        _kind: MediaKind,
        path: &str,
        _caption: Option<&str>,
    ) -> Result<(), DeskError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeskError::ChannelUnavailable);
        }
        self.sent
            .lock()
            .unwrap()
            .push((contact_id.to_string(), format!("[media {path}]")));
        Ok(())
    }

    async fn send_presence(
        &self,
        _contact_id: &str,
        state: PresenceState,
    ) -> Result<(), DeskError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeskError::ChannelUnavailable);
        }
        self.presences
            .lock()
            .unwrap()
            .push(format!("{state:?}").to_lowercase());
        Ok(())
    }

    async fn logout(&self) -> Result<(), DeskError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), DeskError> {
        Ok(())
    }
}
