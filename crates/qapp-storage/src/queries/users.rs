// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registered user and profile operations.

use qapp_core::QappError;
use qapp_core::types::{NewUser, ProfileUpdate};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{Profile, USER_SELECT, User, user_from_row};

fn load_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(&format!("{USER_SELECT} WHERE u.id = ?1"), params![id], user_from_row)
        .optional()
}

/// Register a user with an empty profile.
///
/// Returns [`QappError::Conflict`] if the username is already taken.
pub async fn create_user(db: &Database, user: &NewUser) -> Result<User, QappError> {
    let user = user.clone();
    let username = user.username.clone();
    let created = db
        .connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let taken = tx
                .query_row(
                    "SELECT 1 FROM users WHERE username = ?1",
                    params![user.username],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if taken {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO users (username, token_hash) VALUES (?1, ?2)",
                params![user.username, user.token_hash],
            )?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO profiles (user_id, display_name) VALUES (?1, ?2)",
                params![id, user.display_name],
            )?;
            let created = load_user(&tx, id)?;
            tx.commit()?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| QappError::Conflict(format!("username `{username}` is already taken")))
}

/// Look up the user owning an API token digest.
pub async fn user_by_token_hash(
    db: &Database,
    token_hash: &str,
) -> Result<Option<User>, QappError> {
    let token_hash = token_hash.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                &format!("{USER_SELECT} WHERE u.token_hash = ?1"),
                params![token_hash],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user's profile.
pub async fn get_profile(db: &Database, user_id: i64) -> Result<Option<Profile>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> { load_user(conn, user_id) })
        .await
        .map_err(map_tr_err)
        .map(|user| user.map(|u| u.profile))
}

/// Apply a partial profile update and return the result.
pub async fn update_profile(
    db: &Database,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<Profile, QappError> {
    let update = update.clone();
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE profiles SET
                    display_name = COALESCE(?1, display_name),
                    avatar = COALESCE(?2, avatar),
                    is_anonymous_by_default = COALESCE(?3, is_anonymous_by_default)
                 WHERE user_id = ?4",
                params![
                    update.display_name,
                    update.avatar,
                    update.is_anonymous_by_default,
                    user_id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let user = load_user(&tx, user_id)?;
            tx.commit()?;
            Ok(user)
        })
        .await
        .map_err(map_tr_err)?;

    updated
        .map(|u| u.profile)
        .ok_or_else(|| QappError::not_found("user", user_id))
}
