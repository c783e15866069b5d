// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for forum content.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::QappError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Actor, Created, NewPost, NewReply, NewUser, PostFilter, PostRecord, PostUpdate, Profile,
    ProfileUpdate, ReplyReactionKind, ReplyRecord, ReplyUpdate, SaveOutcome, Tag, TemporaryUser,
    ToggleOutcome, User,
};

/// Storage backend for users, posts, replies, and reactions.
///
/// Lookups return `Ok(None)` for missing rows; mutations of missing rows
/// return [`QappError::NotFound`]. Every mutation is atomic.
#[async_trait]
pub trait ForumStore: PluginAdapter {
    // --- Users ---

    /// Register a user and their (initially empty) profile.
    ///
    /// Returns [`QappError::Conflict`] if the username or token hash is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, QappError>;

    async fn user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, QappError>;

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, QappError>;

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<Profile, QappError>;

    // --- Temporary users ---

    /// Create a temporary user, generating its token when `token` is `None`.
    ///
    /// Returns [`QappError::Conflict`] if the given token is already in use.
    async fn create_temp_user(
        &self,
        token: Option<Uuid>,
        display_name: &str,
    ) -> Result<TemporaryUser, QappError>;

    async fn get_or_create_temp_user(&self, token: Uuid) -> Result<TemporaryUser, QappError>;

    // --- Tags ---

    /// All tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>, QappError>;

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>, QappError>;

    // --- Posts ---

    /// Insert a post, resolving its author and get-or-creating its tags in one transaction.
    async fn create_post(&self, post: &NewPost) -> Result<Created<PostRecord>, QappError>;

    async fn get_post(&self, id: i64) -> Result<Option<PostRecord>, QappError>;

    /// Posts matching `filter`, newest first.
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostRecord>, QappError>;

    /// Posts with the given ids, in the order given. Missing ids are skipped.
    async fn posts_by_ids(&self, ids: &[i64]) -> Result<Vec<PostRecord>, QappError>;

    async fn update_post(&self, id: i64, update: &PostUpdate) -> Result<PostRecord, QappError>;

    async fn delete_post(&self, id: i64) -> Result<(), QappError>;

    async fn all_post_ids(&self) -> Result<Vec<i64>, QappError>;

    // --- Feed support ---

    /// Ids of posts `actor` has reacted to.
    async fn reacted_post_ids(&self, actor: Actor) -> Result<Vec<i64>, QappError>;

    /// Distinct ids of posts sharing at least one tag with `post_ids`,
    /// excluding `post_ids` themselves.
    async fn post_ids_sharing_tags(&self, post_ids: &[i64]) -> Result<Vec<i64>, QappError>;

    // --- Reactions and saves ---

    async fn toggle_post_reaction(
        &self,
        post_id: i64,
        actor: Actor,
    ) -> Result<ToggleOutcome, QappError>;

    async fn toggle_reply_reaction(
        &self,
        reply_id: i64,
        actor: Actor,
        kind: ReplyReactionKind,
    ) -> Result<ToggleOutcome, QappError>;

    async fn toggle_saved(&self, post_id: i64, user_id: i64) -> Result<SaveOutcome, QappError>;

    /// Posts saved by `user_id`, newest first.
    async fn saved_posts(&self, user_id: i64) -> Result<Vec<PostRecord>, QappError>;

    // --- Replies ---

    /// Insert a reply. Returns [`QappError::Validation`] if the post does not exist.
    async fn create_reply(&self, reply: &NewReply) -> Result<Created<ReplyRecord>, QappError>;

    async fn get_reply(&self, id: i64) -> Result<Option<ReplyRecord>, QappError>;

    /// Replies, oldest first, optionally restricted to one post.
    async fn list_replies(&self, post_id: Option<i64>) -> Result<Vec<ReplyRecord>, QappError>;

    async fn update_reply(&self, id: i64, update: &ReplyUpdate)
    -> Result<ReplyRecord, QappError>;

    async fn delete_reply(&self, id: i64) -> Result<(), QappError>;
}
