// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use std::str::FromStr;

use omnidesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{MediaKind, NewMessage, StoredMessage};

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMessage> {
    let media_kind: String = row.get(5)?;
    Ok(StoredMessage {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        content: row.get(2)?,
        from_me: row.get::<_, i64>(3)? != 0,
        from_assistant: row.get::<_, i64>(4)? != 0,
        media_kind: MediaKind::from_str(&media_kind).unwrap_or(MediaKind::Text),
        media_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, contact_id, content, from_me, from_assistant, media_kind, media_url, created_at";

/// Insert a new message and return the stored row.
pub async fn insert_message(db: &Database, msg: NewMessage) -> Result<StoredMessage, DeskError> {
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = chrono::Utc::now().to_rfc3339();
            let stored = conn.query_row(
                &format!(
                    "INSERT INTO messages
                     ({MESSAGE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                params![
                    id,
                    msg.contact_id,
                    msg.content,
                    msg.from_me as i64,
                    msg.from_assistant as i64,
                    msg.media_kind.to_string(),
                    msg.media_url,
                    now,
                ],
                row_to_message,
            )?;
            Ok(stored)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get messages for a contact in arrival order.
///
/// The rowid tiebreak keeps back-to-back messages stable even when their
/// timestamps collide.
pub async fn messages_for_contact(
    db: &Database,
    contact_id: &str,
) -> Result<Vec<StoredMessage>, DeskError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE contact_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![contact_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Edit a message's content (operator action).
pub async fn update_message_content(
    db: &Database,
    id: &str,
    content: &str,
) -> Result<StoredMessage, DeskError> {
    let id = id.to_string();
    let content = content.to_string();
    let result = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "UPDATE messages SET content = ?2 WHERE id = ?1
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                params![id, content],
                row_to_message,
            );
            match result {
                Ok(msg) => Ok(Some(msg)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result.ok_or_else(|| DeskError::NotFound {
        entity: "message",
        id: id.to_string(),
    })
}

/// Delete a message (operator action).
pub async fn delete_message(db: &Database, id: &str) -> Result<(), DeskError> {
    let id = id.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(DeskError::NotFound {
            entity: "message",
            id: id.to_string(),
        });
    }
    Ok(())
}
