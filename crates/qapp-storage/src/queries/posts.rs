// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post CRUD, saved posts, and the id queries behind the feeds.

use std::collections::{BTreeSet, HashMap};

use qapp_core::QappError;
use qapp_core::types::{Created, NewAuthor, NewPost, PostFilter, PostUpdate, SaveOutcome};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::{MAX_BIND_VARS, PostRecord, load_post, load_posts, placeholders};
use crate::queries::tags::set_post_tags;
use crate::queries::temp_users::{create_temp_user_sync, get_or_create_temp_user_sync};

const NEWEST_FIRST: &str = "ORDER BY x.created_at DESC, x.id DESC";

/// Resolved author columns plus the token of a freshly issued temporary user.
pub(crate) struct ResolvedAuthor {
    pub author_id: Option<i64>,
    pub temp_author_id: Option<i64>,
    pub issued_token: Option<Uuid>,
}

/// Map a [`NewAuthor`] onto author columns, creating the temporary user if needed.
pub(crate) fn resolve_author(
    conn: &Connection,
    author: NewAuthor,
) -> rusqlite::Result<ResolvedAuthor> {
    Ok(match author {
        NewAuthor::Registered(user_id) => ResolvedAuthor {
            author_id: Some(user_id),
            temp_author_id: None,
            issued_token: None,
        },
        NewAuthor::Temporary(token) => ResolvedAuthor {
            author_id: None,
            temp_author_id: Some(get_or_create_temp_user_sync(conn, token)?.id),
            issued_token: None,
        },
        NewAuthor::Fresh => {
            let temp = create_temp_user_sync(conn, Uuid::new_v4(), "")?;
            ResolvedAuthor {
                author_id: None,
                temp_author_id: Some(temp.id),
                issued_token: Some(temp.token),
            }
        }
    })
}

pub(crate) fn post_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM posts WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Create a post, its author attribution, and its tag links in one transaction.
pub async fn create_post(db: &Database, post: &NewPost) -> Result<Created<PostRecord>, QappError> {
    let post = post.clone();
    db.connection()
        .call(move |conn| -> Result<Created<PostRecord>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let author = resolve_author(&tx, post.author)?;
            tx.execute(
                "INSERT INTO posts
                     (title, description, author_id, temp_author_id, post_type, hide_identity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    post.title,
                    post.description,
                    author.author_id,
                    author.temp_author_id,
                    post.post_type.to_string(),
                    post.hide_identity,
                ],
            )?;
            let id = tx.last_insert_rowid();
            set_post_tags(&tx, id, &post.tags)?;
            let record = load_post(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(Created {
                record,
                issued_token: author.issued_token,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Get a post by ID.
pub async fn get_post(db: &Database, id: i64) -> Result<Option<PostRecord>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Option<PostRecord>, rusqlite::Error> { load_post(conn, id) })
        .await
        .map_err(map_tr_err)
}

/// List posts, newest first, optionally filtered by type and tag name.
pub async fn list_posts(db: &Database, filter: &PostFilter) -> Result<Vec<PostRecord>, QappError> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    if let Some(post_type) = filter.post_type {
        clauses.push("x.post_type = ?");
        values.push(post_type.to_string());
    }
    if let Some(tag) = &filter.tag {
        clauses.push(
            "EXISTS (SELECT 1 FROM post_tags ptf JOIN tags tf ON tf.id = ptf.tag_id
                     WHERE ptf.post_id = x.id AND tf.name = ?)",
        );
        values.push(tag.clone());
    }
    let tail = if clauses.is_empty() {
        NEWEST_FIRST.to_string()
    } else {
        format!("WHERE {} {NEWEST_FIRST}", clauses.join(" AND "))
    };

    db.connection()
        .call(move |conn| -> Result<Vec<PostRecord>, rusqlite::Error> {
            load_posts(conn, &tail, params_from_iter(values.iter()))
        })
        .await
        .map_err(map_tr_err)
}

/// Load posts by id, preserving the order of `ids`. Unknown ids are skipped.
pub async fn posts_by_ids(db: &Database, ids: &[i64]) -> Result<Vec<PostRecord>, QappError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<PostRecord>, rusqlite::Error> {
            let mut found: HashMap<i64, PostRecord> = HashMap::new();
            for chunk in ids.chunks(MAX_BIND_VARS) {
                let tail = format!("WHERE x.id IN ({})", placeholders(chunk.len()));
                for post in load_posts(conn, &tail, params_from_iter(chunk.iter()))? {
                    found.insert(post.id, post);
                }
            }
            Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update. Replaces the tag set when `update.tags` is set.
pub async fn update_post(
    db: &Database,
    id: i64,
    update: &PostUpdate,
) -> Result<PostRecord, QappError> {
    let update = update.clone();
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<PostRecord>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE posts SET
                    title = COALESCE(?1, title),
                    description = COALESCE(?2, description),
                    post_type = COALESCE(?3, post_type),
                    hide_identity = COALESCE(?4, hide_identity),
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?5",
                params![
                    update.title,
                    update.description,
                    update.post_type.map(|t| t.to_string()),
                    update.hide_identity,
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            if let Some(tags) = &update.tags {
                set_post_tags(&tx, id, tags)?;
            }
            let record = load_post(&tx, id)?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)?;

    updated.ok_or_else(|| QappError::not_found("post", id))
}

/// Delete a post. Replies, reactions, tag links, and saves cascade.
pub async fn delete_post(db: &Database, id: i64) -> Result<(), QappError> {
    let deleted = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
        })
        .await
        .map_err(map_tr_err)?;
    if deleted == 0 {
        return Err(QappError::not_found("post", id));
    }
    Ok(())
}

/// Every post id, newest first.
pub async fn all_post_ids(db: &Database) -> Result<Vec<i64>, QappError> {
    db.connection()
        .call(|conn| -> Result<Vec<i64>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT id FROM posts ORDER BY created_at DESC, id DESC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Distinct ids of posts sharing a tag with any of `post_ids`, excluding `post_ids`.
///
/// Both lookups are chunked so large reaction histories stay under SQLite's
/// bind-variable limit.
pub async fn post_ids_sharing_tags(
    db: &Database,
    post_ids: &[i64],
) -> Result<Vec<i64>, QappError> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }
    let post_ids = post_ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<i64>, rusqlite::Error> {
            let tag_ids = ids_in_chunks(
                conn,
                "SELECT DISTINCT tag_id FROM post_tags WHERE post_id IN",
                &post_ids,
            )?;
            let tag_ids: Vec<i64> = tag_ids.into_iter().collect();
            let mut related = ids_in_chunks(
                conn,
                "SELECT DISTINCT post_id FROM post_tags WHERE tag_id IN",
                &tag_ids,
            )?;
            for id in &post_ids {
                related.remove(id);
            }
            Ok(related.into_iter().collect())
        })
        .await
        .map_err(map_tr_err)
}

/// Run `{select} (?, ...)` once per chunk of `ids` and union the first column.
fn ids_in_chunks(conn: &Connection, select: &str, ids: &[i64]) -> rusqlite::Result<BTreeSet<i64>> {
    let mut out = BTreeSet::new();
    for chunk in ids.chunks(MAX_BIND_VARS) {
        let sql = format!("{select} ({})", placeholders(chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk), |row| row.get::<_, i64>(0))?;
        for id in rows {
            out.insert(id?);
        }
    }
    Ok(out)
}

/// Save the post for `user_id`, or unsave it if already saved.
pub async fn toggle_saved(
    db: &Database,
    post_id: i64,
    user_id: i64,
) -> Result<SaveOutcome, QappError> {
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Option<SaveOutcome>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if !post_exists(&tx, post_id)? {
                return Ok(None);
            }
            let removed = tx.execute(
                "DELETE FROM saved_posts WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            let outcome = if removed > 0 {
                SaveOutcome::Unsaved
            } else {
                tx.execute(
                    "INSERT INTO saved_posts (post_id, user_id) VALUES (?1, ?2)",
                    params![post_id, user_id],
                )?;
                SaveOutcome::Saved
            };
            tx.commit()?;
            Ok(Some(outcome))
        })
        .await
        .map_err(map_tr_err)?;

    outcome.ok_or_else(|| QappError::not_found("post", post_id))
}

/// Posts saved by `user_id`, newest first.
pub async fn saved_posts(db: &Database, user_id: i64) -> Result<Vec<PostRecord>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Vec<PostRecord>, rusqlite::Error> {
            load_posts(
                conn,
                &format!(
                    "WHERE EXISTS (SELECT 1 FROM saved_posts s
                                   WHERE s.post_id = x.id AND s.user_id = ?1) {NEWEST_FIRST}"
                ),
                params![user_id],
            )
        })
        .await
        .map_err(map_tr_err)
}
