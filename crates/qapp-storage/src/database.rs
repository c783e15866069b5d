// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use qapp_core::QappError;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and apply migrations.
    pub async fn open(path: &str) -> Result<Self, QappError> {
        Self::open_with_options(path, true).await
    }

    /// Open the database, choosing whether to switch the journal to WAL.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, QappError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| QappError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;

        conn.call(move |conn| -> Result<Result<(), QappError>, rusqlite::Error> {
            if wal_mode {
                let mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. All queries go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), QappError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), QappError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Wrap a tokio-rusqlite (or any storage-level) error as [`QappError::Storage`].
pub fn map_tr_err<E>(e: E) -> QappError
where
    E: std::error::Error + Send + Sync + 'static,
{
    QappError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("qapp.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_forum_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("schema.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();

        for expected in [
            "post_tags",
            "posts",
            "profiles",
            "reactions",
            "replies",
            "reply_reactions",
            "saved_posts",
            "tags",
            "temporary_users",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_does_not_rerun_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fk.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO replies (post_id, content) VALUES (999, 'orphan')",
                    [],
                )
            })
            .await;
        assert!(result.is_err(), "orphan reply should violate the foreign key");
        db.close().await.unwrap();
    }
}
