// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary (token-only) user operations.

use qapp_core::QappError;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::{TEMP_USER_SELECT, TemporaryUser, temp_user_from_row};

pub(crate) fn create_temp_user_sync(
    conn: &Connection,
    token: Uuid,
    display_name: &str,
) -> rusqlite::Result<TemporaryUser> {
    conn.execute(
        "INSERT INTO temporary_users (token, display_name) VALUES (?1, ?2)",
        params![token.to_string(), display_name],
    )?;
    conn.query_row(
        &format!("{TEMP_USER_SELECT} WHERE id = ?1"),
        params![conn.last_insert_rowid()],
        temp_user_from_row,
    )
}

pub(crate) fn get_or_create_temp_user_sync(
    conn: &Connection,
    token: Uuid,
) -> rusqlite::Result<TemporaryUser> {
    let token = token.to_string();
    conn.execute(
        "INSERT INTO temporary_users (token) VALUES (?1) ON CONFLICT(token) DO NOTHING",
        params![token],
    )?;
    conn.query_row(
        &format!("{TEMP_USER_SELECT} WHERE token = ?1"),
        params![token],
        temp_user_from_row,
    )
}

/// Create a temporary user holding `token`, or a fresh random one.
///
/// Returns [`QappError::Conflict`] if `token` already belongs to a user.
pub async fn create_temp_user(
    db: &Database,
    token: Option<Uuid>,
    display_name: &str,
) -> Result<TemporaryUser, QappError> {
    let token = token.unwrap_or_else(Uuid::new_v4);
    let display_name = display_name.to_string();
    let created = db
        .connection()
        .call(move |conn| -> Result<Option<TemporaryUser>, rusqlite::Error> {
            let taken = conn
                .query_row(
                    "SELECT 1 FROM temporary_users WHERE token = ?1",
                    params![token.to_string()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if taken {
                return Ok(None);
            }
            create_temp_user_sync(conn, token, &display_name).map(Some)
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| QappError::Conflict(format!("temp_token `{token}` is already in use")))
}

/// Return the temporary user holding `token`, creating it on first use.
pub async fn get_or_create_temp_user(
    db: &Database,
    token: Uuid,
) -> Result<TemporaryUser, QappError> {
    db.connection()
        .call(move |conn| -> Result<TemporaryUser, rusqlite::Error> {
            get_or_create_temp_user_sync(conn, token)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_issues_distinct_tokens() {
        let (db, _dir) = setup_db().await;
        let a = create_temp_user(&db, None, "Ghost").await.unwrap();
        let b = create_temp_user(&db, None, "").await.unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.display_name, "Ghost");
        assert_eq!(b.display_name, "");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let token = Uuid::new_v4();
        let first = get_or_create_temp_user(&db, token).await.unwrap();
        let second = get_or_create_temp_user(&db, token).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.token, token);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_or_create_finds_existing_named_user() {
        let (db, _dir) = setup_db().await;
        let created = create_temp_user(&db, None, "Named").await.unwrap();
        let found = get_or_create_temp_user(&db, created.token).await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.display_name, "Named");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn client_token_is_kept_and_unique() {
        let (db, _dir) = setup_db().await;
        let token = Uuid::new_v4();
        let created = create_temp_user(&db, Some(token), "Chosen").await.unwrap();
        assert_eq!(created.token, token);
        assert_eq!(created.display_name, "Chosen");

        let err = create_temp_user(&db, Some(token), "Again").await.unwrap_err();
        assert!(matches!(err, QappError::Conflict(_)));
        db.close().await.unwrap();
    }
}
