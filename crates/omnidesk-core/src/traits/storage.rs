// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence gateway trait consumed by the triage pipeline.
//!
//! Only the operations the inbound pipeline needs cross this seam; listing
//! and search live on the concrete storage type and are consumed by the
//! operator gateway directly.

use async_trait::async_trait;

use crate::error::DeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Contact, NewMessage, NewTicket, StoredMessage, Ticket, TicketPatch};

/// Adapter for the persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Runs migrations and opens the backend.
    async fn initialize(&self) -> Result<(), DeskError>;

    /// Resolves a contact by external identifier, creating it with the given
    /// display name (automation enabled) when unseen. Always bumps the
    /// contact's activity timestamp. Upsert-by-unique-key: concurrent calls
    /// for one identifier never produce duplicates.
    async fn upsert_contact(&self, id: &str, name: &str) -> Result<Contact, DeskError>;

    /// Persists a message and returns the stored row.
    async fn insert_message(&self, msg: NewMessage) -> Result<StoredMessage, DeskError>;

    /// Persists a ticket and returns the stored row.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DeskError>;

    /// Applies a partial update to a ticket.
    async fn update_ticket(&self, id: &str, patch: TicketPatch) -> Result<Ticket, DeskError>;
}
