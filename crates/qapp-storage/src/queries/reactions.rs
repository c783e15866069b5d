// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post and reply reactions.
//!
//! A reaction row carries exactly one of `user_id` / `temp_user_id`.

use qapp_core::QappError;
use qapp_core::types::{Actor, ReplyReactionKind, ToggleOutcome};
use rusqlite::{OptionalExtension, Transaction, params};

use crate::database::{Database, map_tr_err};
use crate::queries::posts::post_exists;

/// Column holding the actor's id and the id itself.
fn actor_column(actor: Actor) -> (&'static str, i64) {
    match actor {
        Actor::Registered(id) => ("user_id", id),
        Actor::Temporary(id) => ("temp_user_id", id),
    }
}

/// Add a reaction to the post, or remove it if `actor` already reacted.
pub async fn toggle_post_reaction(
    db: &Database,
    post_id: i64,
    actor: Actor,
) -> Result<ToggleOutcome, QappError> {
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Option<ToggleOutcome>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if !post_exists(&tx, post_id)? {
                return Ok(None);
            }
            let (column, actor_id) = actor_column(actor);
            let removed = tx.execute(
                &format!("DELETE FROM reactions WHERE post_id = ?1 AND {column} = ?2"),
                params![post_id, actor_id],
            )?;
            let outcome = if removed > 0 {
                ToggleOutcome::Removed
            } else {
                tx.execute(
                    &format!("INSERT INTO reactions (post_id, {column}) VALUES (?1, ?2)"),
                    params![post_id, actor_id],
                )?;
                ToggleOutcome::Added
            };
            tx.commit()?;
            Ok(Some(outcome))
        })
        .await
        .map_err(map_tr_err)?;

    outcome.ok_or_else(|| QappError::not_found("post", post_id))
}

/// Toggle a reply reaction.
///
/// Repeating the same kind removes it. A registered user holds at most one
/// reaction per reply, so a different kind replaces the existing one. A
/// temporary user toggles each kind on its own.
pub async fn toggle_reply_reaction(
    db: &Database,
    reply_id: i64,
    actor: Actor,
    kind: ReplyReactionKind,
) -> Result<ToggleOutcome, QappError> {
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Option<ToggleOutcome>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let reply_exists = tx
                .query_row("SELECT 1 FROM replies WHERE id = ?1", params![reply_id], |_| {
                    Ok(())
                })
                .optional()?
                .is_some();
            if !reply_exists {
                return Ok(None);
            }

            let kind = kind.to_string();
            let outcome = match actor {
                Actor::Registered(user_id) => toggle_single(&tx, reply_id, user_id, &kind)?,
                Actor::Temporary(temp_user_id) => {
                    toggle_per_kind(&tx, reply_id, temp_user_id, &kind)?
                }
            };
            tx.commit()?;
            Ok(Some(outcome))
        })
        .await
        .map_err(map_tr_err)?;

    outcome.ok_or_else(|| QappError::not_found("reply", reply_id))
}

fn toggle_single(
    tx: &Transaction<'_>,
    reply_id: i64,
    user_id: i64,
    kind: &str,
) -> Result<ToggleOutcome, rusqlite::Error> {
    let existing: Option<(i64, String)> = tx
        .query_row(
            "SELECT id, reaction FROM reply_reactions WHERE reply_id = ?1 AND user_id = ?2",
            params![reply_id, user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match existing {
        Some((id, current)) if current == kind => {
            tx.execute("DELETE FROM reply_reactions WHERE id = ?1", params![id])?;
            Ok(ToggleOutcome::Removed)
        }
        Some((id, _)) => {
            tx.execute(
                "UPDATE reply_reactions SET reaction = ?1 WHERE id = ?2",
                params![kind, id],
            )?;
            Ok(ToggleOutcome::Added)
        }
        None => {
            tx.execute(
                "INSERT INTO reply_reactions (reply_id, user_id, reaction) VALUES (?1, ?2, ?3)",
                params![reply_id, user_id, kind],
            )?;
            Ok(ToggleOutcome::Added)
        }
    }
}

fn toggle_per_kind(
    tx: &Transaction<'_>,
    reply_id: i64,
    temp_user_id: i64,
    kind: &str,
) -> Result<ToggleOutcome, rusqlite::Error> {
    let removed = tx.execute(
        "DELETE FROM reply_reactions
         WHERE reply_id = ?1 AND temp_user_id = ?2 AND reaction = ?3",
        params![reply_id, temp_user_id, kind],
    )?;
    if removed > 0 {
        return Ok(ToggleOutcome::Removed);
    }
    tx.execute(
        "INSERT INTO reply_reactions (reply_id, temp_user_id, reaction) VALUES (?1, ?2, ?3)",
        params![reply_id, temp_user_id, kind],
    )?;
    Ok(ToggleOutcome::Added)
}

/// Ids of posts `actor` has reacted to.
pub async fn reacted_post_ids(db: &Database, actor: Actor) -> Result<Vec<i64>, QappError> {
    db.connection()
        .call(move |conn| -> Result<Vec<i64>, rusqlite::Error> {
            let (column, actor_id) = actor_column(actor);
            let mut stmt = conn.prepare(&format!(
                "SELECT post_id FROM reactions WHERE {column} = ?1 ORDER BY post_id"
            ))?;
            let rows = stmt.query_map(params![actor_id], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::posts::{create_post, get_post};
    use crate::queries::replies::create_reply;
    use crate::queries::temp_users::create_temp_user;
    use crate::queries::users::create_user;
    use qapp_core::types::{NewAuthor, NewPost, NewReply, NewUser, PostType};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn post(db: &Database) -> i64 {
        create_post(
            db,
            &NewPost {
                title: "t".to_string(),
                description: "d".to_string(),
                post_type: PostType::Problem,
                tags: Vec::new(),
                hide_identity: false,
                author: NewAuthor::Fresh,
            },
        )
        .await
        .unwrap()
        .record
        .id
    }

    async fn reply(db: &Database, post_id: i64) -> i64 {
        create_reply(
            db,
            &NewReply {
                post_id,
                content: "hang in there".to_string(),
                hide_identity: false,
                author: NewAuthor::Fresh,
            },
        )
        .await
        .unwrap()
        .record
        .id
    }

    async fn registered(db: &Database, name: &str) -> Actor {
        let user = create_user(
            db,
            &NewUser {
                username: name.to_string(),
                display_name: String::new(),
                token_hash: format!("hash-{name}"),
            },
        )
        .await
        .unwrap();
        Actor::Registered(user.id)
    }

    #[tokio::test]
    async fn post_reaction_toggles_and_counts() {
        let (db, _dir) = setup_db().await;
        let post_id = post(&db).await;
        let alice = registered(&db, "alice").await;
        let ghost = Actor::Temporary(create_temp_user(&db, None, "").await.unwrap().id);

        assert_eq!(toggle_post_reaction(&db, post_id, alice).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(toggle_post_reaction(&db, post_id, ghost).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(get_post(&db, post_id).await.unwrap().unwrap().reaction_count, 2);

        assert_eq!(
            toggle_post_reaction(&db, post_id, alice).await.unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(get_post(&db, post_id).await.unwrap().unwrap().reaction_count, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reaction_on_missing_post_is_not_found() {
        let (db, _dir) = setup_db().await;
        let alice = registered(&db, "alice").await;
        let err = toggle_post_reaction(&db, 42, alice).await.unwrap_err();
        assert!(matches!(err, QappError::NotFound { entity: "post", .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reacted_post_ids_are_per_actor() {
        let (db, _dir) = setup_db().await;
        let a = post(&db).await;
        let b = post(&db).await;
        let alice = registered(&db, "alice").await;
        let bob = registered(&db, "bob").await;

        toggle_post_reaction(&db, a, alice).await.unwrap();
        toggle_post_reaction(&db, b, alice).await.unwrap();
        toggle_post_reaction(&db, b, bob).await.unwrap();

        assert_eq!(reacted_post_ids(&db, alice).await.unwrap(), vec![a, b]);
        assert_eq!(reacted_post_ids(&db, bob).await.unwrap(), vec![b]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reply_reaction_same_kind_removes() {
        let (db, _dir) = setup_db().await;
        let reply_id = reply(&db, post(&db).await).await;
        let alice = registered(&db, "alice").await;

        let first = toggle_reply_reaction(&db, reply_id, alice, ReplyReactionKind::Helpful)
            .await
            .unwrap();
        let second = toggle_reply_reaction(&db, reply_id, alice, ReplyReactionKind::Helpful)
            .await
            .unwrap();
        assert_eq!(first, ToggleOutcome::Added);
        assert_eq!(second, ToggleOutcome::Removed);
        db.close().await.unwrap();
    }

    async fn reply_kinds(db: &Database, reply_id: i64) -> Vec<String> {
        db.connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT reaction FROM reply_reactions WHERE reply_id = ?1 ORDER BY reaction",
                )?;
                let rows = stmt.query_map(params![reply_id], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn registered_reply_reaction_different_kind_switches() {
        let (db, _dir) = setup_db().await;
        let reply_id = reply(&db, post(&db).await).await;
        let alice = registered(&db, "alice").await;

        toggle_reply_reaction(&db, reply_id, alice, ReplyReactionKind::Helpful)
            .await
            .unwrap();
        let switched = toggle_reply_reaction(&db, reply_id, alice, ReplyReactionKind::NotSatisfied)
            .await
            .unwrap();
        assert_eq!(switched, ToggleOutcome::Added);
        assert_eq!(reply_kinds(&db, reply_id).await, vec!["not_satisfied".to_string()]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn temp_user_reply_reactions_toggle_per_kind() {
        let (db, _dir) = setup_db().await;
        let reply_id = reply(&db, post(&db).await).await;
        let ghost = Actor::Temporary(create_temp_user(&db, None, "").await.unwrap().id);

        let helpful = toggle_reply_reaction(&db, reply_id, ghost, ReplyReactionKind::Helpful)
            .await
            .unwrap();
        let unsatisfied =
            toggle_reply_reaction(&db, reply_id, ghost, ReplyReactionKind::NotSatisfied)
                .await
                .unwrap();
        assert_eq!(helpful, ToggleOutcome::Added);
        assert_eq!(unsatisfied, ToggleOutcome::Added);
        assert_eq!(
            reply_kinds(&db, reply_id).await,
            vec!["helpful".to_string(), "not_satisfied".to_string()]
        );

        let helpful_again = toggle_reply_reaction(&db, reply_id, ghost, ReplyReactionKind::Helpful)
            .await
            .unwrap();
        assert_eq!(helpful_again, ToggleOutcome::Removed);
        assert_eq!(reply_kinds(&db, reply_id).await, vec!["not_satisfied".to_string()]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reply_reaction_on_missing_reply_is_not_found() {
        let (db, _dir) = setup_db().await;
        let alice = registered(&db, "alice").await;
        let err = toggle_reply_reaction(&db, 7, alice, ReplyReactionKind::Helpful)
            .await
            .unwrap_err();
        assert!(matches!(err, QappError::NotFound { entity: "reply", .. }));
        db.close().await.unwrap();
    }
}
