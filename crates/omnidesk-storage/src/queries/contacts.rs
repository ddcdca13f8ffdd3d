// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact CRUD operations.
//!
//! Contacts are keyed by the external channel address. The upsert relies on
//! `ON CONFLICT ... DO UPDATE` so concurrent inserts for one identifier can
//! never produce duplicates.

use omnidesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Contact;

fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        ai_enabled: row.get::<_, i64>(2)? != 0,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

const CONTACT_COLUMNS: &str = "id, name, ai_enabled, created_at, updated_at";

/// Resolve or create a contact by external identifier, bumping its activity
/// timestamp. New contacts default to automation enabled; existing rows keep
/// their name and automation flag.
pub async fn upsert_contact(db: &Database, id: &str, name: &str) -> Result<Contact, DeskError> {
    let id = id.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let contact = conn.query_row(
                &format!(
                    "INSERT INTO contacts (id, name, ai_enabled, created_at, updated_at)
                     VALUES (?1, ?2, 1, ?3, ?3)
                     ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at
                     RETURNING {CONTACT_COLUMNS}"
                ),
                params![id, name, now],
                row_to_contact,
            )?;
            Ok(contact)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a contact by identifier.
pub async fn get_contact(db: &Database, id: &str) -> Result<Option<Contact>, DeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                row_to_contact,
            );
            match result {
                Ok(contact) => Ok(Some(contact)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all contacts, most recently active first.
pub async fn list_contacts(db: &Database) -> Result<Vec<Contact>, DeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY updated_at DESC"
            ))?;
            let rows = stmt.query_map([], row_to_contact)?;
            let mut contacts = Vec::new();
            for row in rows {
                contacts.push(row?);
            }
            Ok(contacts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a contact's display name.
pub async fn rename_contact(db: &Database, id: &str, name: &str) -> Result<(), DeskError> {
    let id = id.to_string();
    let name = name.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let n = conn.execute(
                "UPDATE contacts SET name = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, name, now],
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(DeskError::NotFound {
            entity: "contact",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Toggle the automation gate for a contact.
pub async fn set_ai_enabled(db: &Database, id: &str, enabled: bool) -> Result<(), DeskError> {
    let id = id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE contacts SET ai_enabled = ?2 WHERE id = ?1",
                params![id, enabled as i64],
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(DeskError::NotFound {
            entity: "contact",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete a contact. Messages and tickets cascade with it.
pub async fn delete_contact(db: &Database, id: &str) -> Result<(), DeskError> {
    let id = id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(DeskError::NotFound {
            entity: "contact",
            id: id.to_string(),
        });
    }
    Ok(())
}
