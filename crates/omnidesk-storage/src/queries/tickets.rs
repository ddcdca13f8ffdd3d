// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket CRUD and workflow transitions.
//!
//! Invariant enforced here: a ticket has an owner only while in progress.
//! Assignment sets the owner together with the status; closing and
//! transferring clear it in the same statement.

use std::str::FromStr;

use omnidesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NewTicket, Ticket, TicketPatch, TicketStatus};

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(6)?;
    let summary: Option<String> = row.get(7)?;
    Ok(Ticket {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        department_id: row.get(2)?,
        assigned_to: row.get(3)?,
        title: row.get(4)?,
        priority: row.get(5)?,
        status: TicketStatus::from_str(&status).unwrap_or(TicketStatus::Queued),
        summary: summary.and_then(|s| serde_json::from_str(&s).ok()),
        closing_note: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const TICKET_COLUMNS: &str = "id, contact_id, department_id, assigned_to, title, priority, \
                              status, summary, closing_note, created_at, updated_at";

/// Create a ticket and return the stored row.
pub async fn create_ticket(db: &Database, ticket: NewTicket) -> Result<Ticket, DeskError> {
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = chrono::Utc::now().to_rfc3339();
            let summary = ticket
                .summary
                .as_ref()
                .map(|s| s.to_string());
            let stored = conn.query_row(
                &format!(
                    "INSERT INTO tickets
                     (id, contact_id, title, priority, status, summary, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![
                    id,
                    ticket.contact_id,
                    ticket.title,
                    ticket.priority,
                    ticket.status.to_string(),
                    summary,
                    now,
                ],
                row_to_ticket,
            )?;
            Ok(stored)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a ticket by id.
pub async fn get_ticket(db: &Database, id: &str) -> Result<Option<Ticket>, DeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
                params![id],
                row_to_ticket,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Board listing: every open ticket newest-first, plus the ten most recently
/// closed so the done column stays readable.
pub async fn board_tickets(db: &Database) -> Result<Vec<Ticket>, DeskError> {
    db.connection()
        .call(|conn| {
            let mut tickets = Vec::new();

            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets
                 WHERE status != 'closed' ORDER BY created_at DESC"
            ))?;
            for row in stmt.query_map([], row_to_ticket)? {
                tickets.push(row?);
            }

            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets
                 WHERE status = 'closed' ORDER BY updated_at DESC LIMIT 10"
            ))?;
            for row in stmt.query_map([], row_to_ticket)? {
                tickets.push(row?);
            }

            Ok(tickets)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ticket ids belonging to a contact (used to publish deletions before a
/// cascade delete).
pub async fn ticket_ids_for_contact(
    db: &Database,
    contact_id: &str,
) -> Result<Vec<String>, DeskError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM tickets WHERE contact_id = ?1")?;
            let rows = stmt.query_map(params![contact_id], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Assign a ticket to an agent: status becomes in_progress, the owner is set,
/// and the agent's department (when known) is recorded.
pub async fn assign_ticket(
    db: &Database,
    id: &str,
    user_id: &str,
    department_id: Option<&str>,
) -> Result<Ticket, DeskError> {
    let id_owned = id.to_string();
    let user_id = user_id.to_string();
    let department_id = department_id.map(|d| d.to_string());
    let result = db
        .connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let result = conn.query_row(
                &format!(
                    "UPDATE tickets
                     SET assigned_to = ?2, status = 'in_progress',
                         department_id = COALESCE(?3, department_id), updated_at = ?4
                     WHERE id = ?1
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![id_owned, user_id, department_id, now],
                row_to_ticket,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result.ok_or_else(|| DeskError::NotFound {
        entity: "ticket",
        id: id.to_string(),
    })
}

/// Close a ticket: status becomes closed, the closing note is recorded, and
/// the owner is cleared.
pub async fn close_ticket(
    db: &Database,
    id: &str,
    closing_note: Option<&str>,
) -> Result<Ticket, DeskError> {
    let id_owned = id.to_string();
    let closing_note = closing_note.map(|n| n.to_string());
    let result = db
        .connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let result = conn.query_row(
                &format!(
                    "UPDATE tickets
                     SET status = 'closed', closing_note = ?2, assigned_to = NULL,
                         updated_at = ?3
                     WHERE id = ?1
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![id_owned, closing_note, now],
                row_to_ticket,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result.ok_or_else(|| DeskError::NotFound {
        entity: "ticket",
        id: id.to_string(),
    })
}

/// Transfer a ticket to another department: back to the queue, owner cleared.
pub async fn transfer_ticket(
    db: &Database,
    id: &str,
    department_id: Option<&str>,
) -> Result<Ticket, DeskError> {
    let id_owned = id.to_string();
    let department_id = department_id.map(|d| d.to_string());
    let result = db
        .connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let result = conn.query_row(
                &format!(
                    "UPDATE tickets
                     SET status = 'queued', department_id = ?2, assigned_to = NULL,
                         updated_at = ?3
                     WHERE id = ?1
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![id_owned, department_id, now],
                row_to_ticket,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result.ok_or_else(|| DeskError::NotFound {
        entity: "ticket",
        id: id.to_string(),
    })
}

/// Apply a partial update. Setting a status other than `in_progress` clears
/// the owner so the invariant survives generic patches too.
pub async fn update_ticket(
    db: &Database,
    id: &str,
    patch: TicketPatch,
) -> Result<Ticket, DeskError> {
    let id_owned = id.to_string();
    let result = db
        .connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            let clears_owner = patch
                .status
                .is_some_and(|s| s != TicketStatus::InProgress);
            let result = conn.query_row(
                &format!(
                    "UPDATE tickets
                     SET title = COALESCE(?2, title),
                         priority = COALESCE(?3, priority),
                         status = COALESCE(?4, status),
                         department_id = COALESCE(?5, department_id),
                         closing_note = COALESCE(?6, closing_note),
                         assigned_to = CASE WHEN ?7 THEN NULL ELSE assigned_to END,
                         updated_at = ?8
                     WHERE id = ?1
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![
                    id_owned,
                    patch.title,
                    patch.priority,
                    patch.status.map(|s| s.to_string()),
                    patch.department_id,
                    patch.closing_note,
                    clears_owner,
                    now,
                ],
                row_to_ticket,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result.ok_or_else(|| DeskError::NotFound {
        entity: "ticket",
        id: id.to_string(),
    })
}
