// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag operations.

use qapp_core::QappError;
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::Tag;

/// Replace the tag set of `post_id` with `names`, creating unknown tags.
pub(crate) fn set_post_tags(
    conn: &Connection,
    post_id: i64,
    names: &[String],
) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM post_tags WHERE post_id = ?1", params![post_id])?;
    for name in names {
        conn.execute(
            "INSERT INTO tags (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id)
             SELECT ?1, id FROM tags WHERE name = ?2",
            params![post_id, name],
        )?;
    }
    Ok(())
}

/// List all tags ordered by name.
pub async fn list_tags(db: &Database) -> Result<Vec<Tag>, QappError> {
    db.connection()
        .call(|conn| -> Result<Vec<Tag>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
            let rows = stmt.query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a tag by ID.
pub async fn get_tag(db: &Database, id: i64) -> Result<Option<Tag>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Option<Tag>, rusqlite::Error> {
            conn.query_row("SELECT id, name FROM tags WHERE id = ?1", params![id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
