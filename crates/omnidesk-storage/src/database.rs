// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use omnidesk_core::DeskError;
use tracing::info;

/// Handle to the single SQLite connection backing the desk.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs,
    /// and runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, DeskError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DeskError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;

        Self::setup(&conn, wal_mode).await?;
        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Opens an in-memory database with migrations applied. Test use only.
    pub async fn open_in_memory() -> Result<Self, DeskError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_tr_err)?;
        Self::setup(&conn, false).await?;
        Ok(Self { conn })
    }

    async fn setup(conn: &tokio_rusqlite::Connection, wal_mode: bool) -> Result<(), DeskError> {
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5_000)?;
            crate::migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
    }

    /// The underlying tokio-rusqlite connection. Query modules call through
    /// this; nothing else should.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes and closes the connection.
    pub async fn close(&self) -> Result<(), DeskError> {
        self.conn.call(|conn| {
            conn.execute_batch("PRAGMA optimize")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
    }
}

/// Maps a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> DeskError {
    DeskError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_in_memory_runs_migrations() {
        let db = Database::open_in_memory().await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type='table'
                     AND name IN ('contacts','messages','tickets')",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/omnidesk.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
        assert!(path.exists());
    }
}
