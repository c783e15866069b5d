// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply CRUD.

use qapp_core::QappError;
use qapp_core::types::{Created, NewReply, ReplyUpdate};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{ReplyRecord, load_reply, reply_from_row, reply_select};
use crate::queries::posts::{post_exists, resolve_author};

const OLDEST_FIRST: &str = "ORDER BY x.created_at ASC, x.id ASC";

/// Create a reply on an existing post.
///
/// Returns [`QappError::Validation`] if the target post does not exist.
pub async fn create_reply(
    db: &Database,
    reply: &NewReply,
) -> Result<Created<ReplyRecord>, QappError> {
    let reply = reply.clone();
    let post_id = reply.post_id;
    let created = db
        .connection()
        .call(move |conn| -> Result<Option<Created<ReplyRecord>>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if !post_exists(&tx, reply.post_id)? {
                return Ok(None);
            }
            let author = resolve_author(&tx, reply.author)?;
            tx.execute(
                "INSERT INTO replies (post_id, content, author_id, temp_author_id, hide_identity)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reply.post_id,
                    reply.content,
                    author.author_id,
                    author.temp_author_id,
                    reply.hide_identity,
                ],
            )?;
            let record = load_reply(&tx, tx.last_insert_rowid())?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(Some(Created {
                record,
                issued_token: author.issued_token,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| QappError::Validation(format!("post {post_id} does not exist")))
}

/// Get a reply by ID.
pub async fn get_reply(db: &Database, id: i64) -> Result<Option<ReplyRecord>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Option<ReplyRecord>, rusqlite::Error> { load_reply(conn, id) })
        .await
        .map_err(map_tr_err)
}

/// List replies oldest first, optionally restricted to one post.
pub async fn list_replies(
    db: &Database,
    post_id: Option<i64>,
) -> Result<Vec<ReplyRecord>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Vec<ReplyRecord>, rusqlite::Error> {
            match post_id {
                Some(post_id) => {
                    let sql = format!("{} WHERE x.post_id = ?1 {OLDEST_FIRST}", reply_select());
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params![post_id], reply_from_row)?;
                    rows.collect()
                }
                None => {
                    let sql = format!("{} {OLDEST_FIRST}", reply_select());
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map([], reply_from_row)?;
                    rows.collect()
                }
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update to a reply.
pub async fn update_reply(
    db: &Database,
    id: i64,
    update: &ReplyUpdate,
) -> Result<ReplyRecord, QappError> {
    let update = update.clone();
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<ReplyRecord>, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE replies SET
                    content = COALESCE(?1, content),
                    hide_identity = COALESCE(?2, hide_identity)
                 WHERE id = ?3",
                params![update.content, update.hide_identity, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_reply(conn, id)
        })
        .await
        .map_err(map_tr_err)?;

    updated.ok_or_else(|| QappError::not_found("reply", id))
}

/// Delete a reply and its reactions.
pub async fn delete_reply(db: &Database, id: i64) -> Result<(), QappError> {
    let deleted = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM replies WHERE id = ?1", params![id])
        })
        .await
        .map_err(map_tr_err)?;
    if deleted == 0 {
        return Err(QappError::not_found("reply", id));
    }
    Ok(())
}
