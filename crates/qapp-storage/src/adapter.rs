// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ForumStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use qapp_config::model::StorageConfig;
use qapp_core::types::{
    Actor, Created, NewPost, NewReply, NewUser, PostFilter, PostRecord, PostUpdate, Profile,
    ProfileUpdate, ReplyReactionKind, ReplyRecord, ReplyUpdate, SaveOutcome, Tag, TemporaryUser,
    ToggleOutcome, User,
};
use qapp_core::{ForumStore, HealthStatus, PluginAdapter, QappError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed forum store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened by [`SqliteStorage::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and apply pending migrations.
    pub async fn initialize(&self) -> Result<(), QappError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with_options(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| QappError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }


    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, QappError> {
        self.db.get().ok_or_else(|| QappError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

/// A failed integrity check is unhealthy. A journal that fell back from WAL
/// still serves requests, so it only degrades.
fn classify_health(wal_expected: bool, journal_mode: &str, integrity: &str) -> HealthStatus {
    if integrity != "ok" {
        HealthStatus::Unhealthy(format!("integrity check failed: {integrity}"))
    } else if wal_expected && !journal_mode.eq_ignore_ascii_case("wal") {
        HealthStatus::Degraded(format!("journal_mode is {journal_mode}, expected wal"))
    } else {
        HealthStatus::Healthy
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, QappError> {
        let (journal_mode, integrity) = self
            .db()?
            .connection()
            .call(|conn| -> Result<(String, String), rusqlite::Error> {
                let journal_mode = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                let integrity = conn.query_row("PRAGMA quick_check", [], |row| row.get(0))?;
                Ok((journal_mode, integrity))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(classify_health(self.config.wal_mode, &journal_mode, &integrity))
    }

    /// Checkpoint the WAL. The connection closes when the store is dropped.
    async fn shutdown(&self) -> Result<(), QappError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ForumStore for SqliteStorage {
    // --- Users ---

    async fn create_user(&self, user: &NewUser) -> Result<User, QappError> {
        queries::users::create_user(self.db()?, user).await
    }

    async fn user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, QappError> {
        queries::users::user_by_token_hash(self.db()?, token_hash).await
    }

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, QappError> {
        queries::users::get_profile(self.db()?, user_id).await
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<Profile, QappError> {
        queries::users::update_profile(self.db()?, user_id, update).await
    }

    // --- Temporary users ---

    async fn create_temp_user(
        &self,
        token: Option<Uuid>,
        display_name: &str,
    ) -> Result<TemporaryUser, QappError> {
        queries::temp_users::create_temp_user(self.db()?, token, display_name).await
    }

    async fn get_or_create_temp_user(&self, token: Uuid) -> Result<TemporaryUser, QappError> {
        queries::temp_users::get_or_create_temp_user(self.db()?, token).await
    }

    // --- Tags ---

    async fn list_tags(&self) -> Result<Vec<Tag>, QappError> {
        queries::tags::list_tags(self.db()?).await
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>, QappError> {
        queries::tags::get_tag(self.db()?, id).await
    }

    // --- Posts ---

    async fn create_post(&self, post: &NewPost) -> Result<Created<PostRecord>, QappError> {
        queries::posts::create_post(self.db()?, post).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<PostRecord>, QappError> {
        queries::posts::get_post(self.db()?, id).await
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostRecord>, QappError> {
        queries::posts::list_posts(self.db()?, filter).await
    }

    async fn posts_by_ids(&self, ids: &[i64]) -> Result<Vec<PostRecord>, QappError> {
        queries::posts::posts_by_ids(self.db()?, ids).await
    }

    async fn update_post(&self, id: i64, update: &PostUpdate) -> Result<PostRecord, QappError> {
        queries::posts::update_post(self.db()?, id, update).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), QappError> {
        queries::posts::delete_post(self.db()?, id).await
    }

    async fn all_post_ids(&self) -> Result<Vec<i64>, QappError> {
        queries::posts::all_post_ids(self.db()?).await
    }

    // --- Feed support ---

    async fn reacted_post_ids(&self, actor: Actor) -> Result<Vec<i64>, QappError> {
        queries::reactions::reacted_post_ids(self.db()?, actor).await
    }

    async fn post_ids_sharing_tags(&self, post_ids: &[i64]) -> Result<Vec<i64>, QappError> {
        queries::posts::post_ids_sharing_tags(self.db()?, post_ids).await
    }

    // --- Reactions and saves ---

    async fn toggle_post_reaction(
        &self,
        post_id: i64,
        actor: Actor,
    ) -> Result<ToggleOutcome, QappError> {
        queries::reactions::toggle_post_reaction(self.db()?, post_id, actor).await
    }

    async fn toggle_reply_reaction(
        &self,
        reply_id: i64,
        actor: Actor,
        kind: ReplyReactionKind,
    ) -> Result<ToggleOutcome, QappError> {
        queries::reactions::toggle_reply_reaction(self.db()?, reply_id, actor, kind).await
    }

    async fn toggle_saved(&self, post_id: i64, user_id: i64) -> Result<SaveOutcome, QappError> {
        queries::posts::toggle_saved(self.db()?, post_id, user_id).await
    }

    async fn saved_posts(&self, user_id: i64) -> Result<Vec<PostRecord>, QappError> {
        queries::posts::saved_posts(self.db()?, user_id).await
    }

    // --- Replies ---

    async fn create_reply(&self, reply: &NewReply) -> Result<Created<ReplyRecord>, QappError> {
        queries::replies::create_reply(self.db()?, reply).await
    }

    async fn get_reply(&self, id: i64) -> Result<Option<ReplyRecord>, QappError> {
        queries::replies::get_reply(self.db()?, id).await
    }

    async fn list_replies(&self, post_id: Option<i64>) -> Result<Vec<ReplyRecord>, QappError> {
        queries::replies::list_replies(self.db()?, post_id).await
    }

    async fn update_reply(
        &self,
        id: i64,
        update: &ReplyUpdate,
    ) -> Result<ReplyRecord, QappError> {
        queries::replies::update_reply(self.db()?, id, update).await
    }

    async fn delete_reply(&self, id: i64) -> Result<(), QappError> {
        queries::replies::delete_reply(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qapp_core::types::{NewAuthor, PostType};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_identifies_itself() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_without_wal_is_healthy_when_not_requested() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("rollback.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: false,
        });
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[test]
    fn health_classification() {
        assert_eq!(classify_health(true, "wal", "ok"), HealthStatus::Healthy);
        assert_eq!(classify_health(false, "delete", "ok"), HealthStatus::Healthy);
        assert_eq!(
            classify_health(true, "delete", "ok"),
            HealthStatus::Degraded("journal_mode is delete, expected wal".to_string())
        );
        assert!(matches!(
            classify_health(true, "wal", "*** in database main ***"),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        assert!(storage.list_tags().await.is_err());
        // Shutdown of an unopened store is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn post_lifecycle_through_trait_object() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        let store: &dyn ForumStore = &storage;

        let user = store
            .create_user(&NewUser {
                username: "dana".to_string(),
                display_name: "Dana".to_string(),
                token_hash: "hash-dana".to_string(),
            })
            .await
            .unwrap();

        let created = store
            .create_post(&NewPost {
                title: "Can't sleep".to_string(),
                description: "Every night at 3am".to_string(),
                post_type: PostType::Problem,
                tags: vec!["sleep".to_string()],
                hide_identity: false,
                author: NewAuthor::Registered(user.id),
            })
            .await
            .unwrap();
        let post = created.record;
        assert_eq!(post.author_display_name(), "Dana");

        let reply = store
            .create_reply(&NewReply {
                post_id: post.id,
                content: "Same".to_string(),
                hide_identity: true,
                author: NewAuthor::Fresh,
            })
            .await
            .unwrap();
        assert!(reply.issued_token.is_some());
        assert_eq!(reply.record.author_display_name(), "Anonymous");

        let outcome = store
            .toggle_post_reaction(post.id, Actor::Registered(user.id))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert_eq!(store.get_post(post.id).await.unwrap().unwrap().reaction_count, 1);

        assert_eq!(store.list_replies(Some(post.id)).await.unwrap().len(), 1);
        store.delete_post(post.id).await.unwrap();
        assert!(store.list_replies(Some(post.id)).await.unwrap().is_empty());

        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.create_temp_user(None, "Ghost").await.unwrap();
        storage.shutdown().await.unwrap();
    }
}
