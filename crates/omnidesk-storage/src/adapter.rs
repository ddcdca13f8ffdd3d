// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the persistence gateway.
//!
//! The [`StorageAdapter`] trait surface carries the operations the triage
//! pipeline issues; the inherent methods below it carry the listing and
//! workflow operations consumed by the operator gateway.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use omnidesk_config::model::StorageConfig;
use omnidesk_core::{
    AdapterType, Contact, DeskError, HealthStatus, NewMessage, NewTicket, PluginAdapter,
    StorageAdapter, StoredMessage, Ticket, TicketPatch,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed persistence gateway.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, DeskError> {
        self.db.get().ok_or_else(|| DeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    // --- Contact operations (operator surface) ---

    pub async fn get_contact(&self, id: &str) -> Result<Option<Contact>, DeskError> {
        queries::contacts::get_contact(self.db()?, id).await
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, DeskError> {
        queries::contacts::list_contacts(self.db()?).await
    }

    pub async fn rename_contact(&self, id: &str, name: &str) -> Result<(), DeskError> {
        queries::contacts::rename_contact(self.db()?, id, name).await
    }

    pub async fn set_ai_enabled(&self, id: &str, enabled: bool) -> Result<(), DeskError> {
        queries::contacts::set_ai_enabled(self.db()?, id, enabled).await
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), DeskError> {
        queries::contacts::delete_contact(self.db()?, id).await
    }

    // --- Message operations (operator surface) ---

    pub async fn messages_for_contact(
        &self,
        contact_id: &str,
    ) -> Result<Vec<StoredMessage>, DeskError> {
        queries::messages::messages_for_contact(self.db()?, contact_id).await
    }

    pub async fn update_message_content(
        &self,
        id: &str,
        content: &str,
    ) -> Result<StoredMessage, DeskError> {
        queries::messages::update_message_content(self.db()?, id, content).await
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), DeskError> {
        queries::messages::delete_message(self.db()?, id).await
    }

    // --- Ticket operations (operator surface) ---

    pub async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, DeskError> {
        queries::tickets::get_ticket(self.db()?, id).await
    }

    pub async fn board_tickets(&self) -> Result<Vec<Ticket>, DeskError> {
        queries::tickets::board_tickets(self.db()?).await
    }

    pub async fn ticket_ids_for_contact(
        &self,
        contact_id: &str,
    ) -> Result<Vec<String>, DeskError> {
        queries::tickets::ticket_ids_for_contact(self.db()?, contact_id).await
    }

    pub async fn assign_ticket(
        &self,
        id: &str,
        user_id: &str,
        department_id: Option<&str>,
    ) -> Result<Ticket, DeskError> {
        queries::tickets::assign_ticket(self.db()?, id, user_id, department_id).await
    }

    pub async fn close_ticket(
        &self,
        id: &str,
        closing_note: Option<&str>,
    ) -> Result<Ticket, DeskError> {
        queries::tickets::close_ticket(self.db()?, id, closing_note).await
    }

    pub async fn transfer_ticket(
        &self,
        id: &str,
        department_id: Option<&str>,
    ) -> Result<Ticket, DeskError> {
        queries::tickets::transfer_ticket(self.db()?, id, department_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), DeskError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| DeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn upsert_contact(&self, id: &str, name: &str) -> Result<Contact, DeskError> {
        queries::contacts::upsert_contact(self.db()?, id, name).await
    }

    async fn insert_message(&self, msg: NewMessage) -> Result<StoredMessage, DeskError> {
        queries::messages::insert_message(self.db()?, msg).await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, DeskError> {
        queries::tickets::create_ticket(self.db()?, ticket).await
    }

    async fn update_ticket(&self, id: &str, patch: TicketPatch) -> Result<Ticket, DeskError> {
        queries::tickets::update_ticket(self.db()?, id, patch).await
    }
}
