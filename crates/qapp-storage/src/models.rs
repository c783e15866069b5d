// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types and the row mapping shared by the query modules.
//!
//! The canonical types live in `qapp-core::types` for use across the
//! [`ForumStore`](qapp_core::ForumStore) boundary; they are re-exported here.

use std::collections::HashMap;

use rusqlite::types::Type;
use rusqlite::{Connection, Row, params_from_iter};
use uuid::Uuid;

pub use qapp_core::identity::{Authorship, RegisteredAuthor, TemporaryAuthor};
pub use qapp_core::types::{
    Actor, PostRecord, PostType, Profile, ReplyReactionKind, ReplyRecord, Tag, TemporaryUser,
    User,
};

/// SQLite's default host parameter limit is far above this; chunking keeps
/// `IN (...)` lists bounded regardless of the build.
pub(crate) const MAX_BIND_VARS: usize = 500;

/// Author columns selected by [`POST_SELECT`] and [`REPLY_SELECT`], in the
/// order [`authorship_from_row`] expects.
const AUTHOR_COLUMNS: &str = "x.author_id, u.username, pr.display_name, \
     x.temp_author_id, tu.token, tu.display_name";

const AUTHOR_JOINS: &str = "LEFT JOIN users u ON u.id = x.author_id \
     LEFT JOIN profiles pr ON pr.user_id = x.author_id \
     LEFT JOIN temporary_users tu ON tu.id = x.temp_author_id";

/// Post columns 0..=6, author columns 7..=12, reaction count 13.
pub(crate) fn post_select() -> String {
    format!(
        "SELECT x.id, x.title, x.description, x.post_type, x.hide_identity, x.created_at, \
         x.updated_at, {AUTHOR_COLUMNS}, \
         (SELECT COUNT(*) FROM reactions r WHERE r.post_id = x.id) \
         FROM posts x {AUTHOR_JOINS}"
    )
}

/// Reply columns 0..=4, author columns 5..=10.
pub(crate) fn reply_select() -> String {
    format!(
        "SELECT x.id, x.post_id, x.content, x.hide_identity, x.created_at, {AUTHOR_COLUMNS} \
         FROM replies x {AUTHOR_JOINS}"
    )
}

pub(crate) const USER_SELECT: &str = "SELECT u.id, u.username, u.created_at, \
     p.display_name, p.avatar, p.is_anonymous_by_default, p.created_at \
     FROM users u JOIN profiles p ON p.user_id = u.id";

pub(crate) const TEMP_USER_SELECT: &str =
    "SELECT id, token, display_name, created_at FROM temporary_users";

/// `?,?,?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn authorship_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Authorship> {
    let registered = match row.get::<_, Option<i64>>(offset)? {
        Some(user_id) => Some(RegisteredAuthor {
            user_id,
            username: row.get(offset + 1)?,
            display_name: row
                .get::<_, Option<String>>(offset + 2)?
                .unwrap_or_default(),
        }),
        None => None,
    };
    let temporary = match row.get::<_, Option<i64>>(offset + 3)? {
        Some(temp_user_id) => Some(TemporaryAuthor {
            temp_user_id,
            token: uuid_at(row, offset + 4)?,
            display_name: row.get(offset + 5)?,
        }),
        None => None,
    };
    Ok(Authorship {
        registered,
        temporary,
    })
}

pub(crate) fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    let post_type: String = row.get(3)?;
    Ok(PostRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        post_type: post_type
            .parse::<PostType>()
            .map_err(|e| conversion_error(3, e))?,
        hide_identity: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        author: authorship_from_row(row, 7)?,
        tags: Vec::new(),
        reaction_count: row.get(13)?,
    })
}

pub(crate) fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<ReplyRecord> {
    Ok(ReplyRecord {
        id: row.get(0)?,
        post_id: row.get(1)?,
        content: row.get(2)?,
        hide_identity: row.get(3)?,
        created_at: row.get(4)?,
        author: authorship_from_row(row, 5)?,
    })
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: i64 = row.get(0)?;
    Ok(User {
        id,
        username: row.get(1)?,
        created_at: row.get(2)?,
        profile: Profile {
            user_id: id,
            display_name: row.get(3)?,
            avatar: row.get(4)?,
            is_anonymous_by_default: row.get(5)?,
            created_at: row.get(6)?,
        },
    })
}

pub(crate) fn temp_user_from_row(row: &Row<'_>) -> rusqlite::Result<TemporaryUser> {
    Ok(TemporaryUser {
        id: row.get(0)?,
        token: uuid_at(row, 1)?,
        display_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Run `SELECT ... FROM posts x ... {tail}` and attach tags to every row.
pub(crate) fn load_posts<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> rusqlite::Result<Vec<PostRecord>> {
    let sql = format!("{} {tail}", post_select());
    let mut stmt = conn.prepare(&sql)?;
    let mut posts = stmt
        .query_map(params, post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_tags(conn, &mut posts)?;
    Ok(posts)
}

pub(crate) fn load_post(conn: &Connection, id: i64) -> rusqlite::Result<Option<PostRecord>> {
    Ok(load_posts(conn, "WHERE x.id = ?1", [id])?.pop())
}

pub(crate) fn load_reply(conn: &Connection, id: i64) -> rusqlite::Result<Option<ReplyRecord>> {
    let sql = format!("{} WHERE x.id = ?1", reply_select());
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query_map([id], reply_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.pop())
}

/// Fill `tags` on each post, sorted by tag name.
fn attach_tags(conn: &Connection, posts: &mut [PostRecord]) -> rusqlite::Result<()> {
    if posts.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let mut by_post: HashMap<i64, Vec<Tag>> = HashMap::new();
    for chunk in ids.chunks(MAX_BIND_VARS) {
        let sql = format!(
            "SELECT pt.post_id, t.id, t.name FROM post_tags pt \
             JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id IN ({}) ORDER BY t.name",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                Tag {
                    id: row.get(1)?,
                    name: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (post_id, tag) = row?;
            by_post.entry(post_id).or_default().push(tag);
        }
    }

    for post in posts.iter_mut() {
        post.tags = by_post.remove(&post.id).unwrap_or_default();
    }
    Ok(())
}
