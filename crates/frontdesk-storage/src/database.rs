// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! single-writer model is what makes the check-then-act transactions in the
//! query modules serializable.

use frontdesk_core::FrontdeskError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Wraps a single `tokio_rusqlite::Connection`; every query module accepts
/// `&Database` and funnels through [`Database::connection`].
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs,
    /// and runs embedded migrations.
    pub async fn open(path: &str) -> Result<Self, FrontdeskError> {
        // Migrations run on a plain blocking connection before the async
        // handle opens; WAL mode set here persists in the database file.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), FrontdeskError> {
            let mut conn =
                rusqlite::Connection::open(&migrate_path).map_err(|e| FrontdeskError::Storage {
                    source: Box::new(e),
                })?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(|e| FrontdeskError::Storage {
                source: Box::new(e),
            })?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| FrontdeskError::Internal(format!("migration task panicked: {e}")))??;

        // `Connection::open` fails with a plain rusqlite error before any
        // call queue exists, so it is mapped directly.
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| FrontdeskError::Storage {
                source: Box::new(e),
            })?;

        // Per-connection PRAGMAs for the long-lived writer.
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is current. The
    /// connection itself closes when the handle is dropped.
    pub async fn close(&self) -> Result<(), FrontdeskError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> FrontdeskError {
    FrontdeskError::Storage {
        source: Box::new(e),
    }
}

/// Maps a tokio-rusqlite error, turning UNIQUE/CHECK constraint violations
/// into `Conflict` so callers can surface "lost the race" cleanly.
pub(crate) fn map_constraint_err(e: tokio_rusqlite::Error, conflict_msg: &str) -> FrontdeskError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(inner, _)) = &e
        && inner.code == rusqlite::ErrorCode::ConstraintViolation
    {
        return FrontdeskError::Conflict(conflict_msg.to_string());
    }
    map_tr_err(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                     ('conversations', 'messages', 'wait_queue', 'audit_log', 'ratings', 'faq_entries')",
                    [],
                    |row| row.get::<_, i64>(0),
                )?;
                Ok::<_, rusqlite::Error>(count)
            })
            .await
            .unwrap();
        assert_eq!(count, 6);
        db.close().await.unwrap();

        // Reopening must not re-apply migrations.
        let db2 = Database::open(path).await.unwrap();
        db2.close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_is_active() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("wal.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let mode: String = db
            .connection()
            .call(|conn| {
                let mode = conn.query_row("PRAGMA journal_mode;", [], |row| row.get::<_, String>(0))?;
                Ok::<_, rusqlite::Error>(mode)
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().await.unwrap();
    }
}
