// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store trait, the feed engine, and the gateway.
//!
//! Timestamps are ISO-8601 UTC strings produced by the storage layer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::identity::Authorship;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Kind of a post.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PostType {
    #[default]
    Problem,
    Journey,
}

/// Feedback left on a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReplyReactionKind {
    Helpful,
    NotSatisfied,
}

/// A registered user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub display_name: String,
    pub avatar: String,
    pub is_anonymous_by_default: bool,
    pub created_at: String,
}

/// A registered user together with their profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: String,
    pub profile: Profile,
}

/// Partial update applied to a profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub is_anonymous_by_default: Option<bool>,
}

/// Data needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    /// SHA-256 hex digest of the API token. The raw token is never stored.
    pub token_hash: String,
}

/// An anonymous poster identified only by a client-held token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryUser {
    pub id: i64,
    pub token: Uuid,
    pub display_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A post as read back from storage, with its author, tags, and reaction count resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub post_type: PostType,
    pub hide_identity: bool,
    pub author: Authorship,
    pub tags: Vec<Tag>,
    pub reaction_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PostRecord {
    /// Name shown next to the post.
    pub fn author_display_name(&self) -> String {
        self.author.display_name(self.hide_identity)
    }
}

/// A reply as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub hide_identity: bool,
    pub author: Authorship,
    pub created_at: String,
}

impl ReplyRecord {
    /// Name shown next to the reply.
    pub fn author_display_name(&self) -> String {
        self.author.display_name(self.hide_identity)
    }
}

/// Who is recorded as the author of a new post or reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewAuthor {
    /// A registered user.
    Registered(i64),
    /// The temporary user holding this token, created on first use.
    Temporary(Uuid),
    /// A brand-new temporary user with a server-generated token.
    Fresh,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub post_type: PostType,
    pub tags: Vec<String>,
    pub hide_identity: bool,
    pub author: NewAuthor,
}

/// Partial update applied to a post. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_type: Option<PostType>,
    pub tags: Option<Vec<String>>,
    pub hide_identity: Option<bool>,
}

/// Filters for listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub tag: Option<String>,
}

/// Result of creating a post or reply.
#[derive(Debug, Clone)]
pub struct Created<T> {
    pub record: T,
    /// Set when the row was attributed to a freshly issued temporary user.
    pub issued_token: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub post_id: i64,
    pub content: String,
    pub hide_identity: bool,
    pub author: NewAuthor,
}

/// Partial update applied to a reply.
#[derive(Debug, Clone, Default)]
pub struct ReplyUpdate {
    pub content: Option<String>,
    pub hide_identity: Option<bool>,
}

/// The identity a reaction is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Registered(i64),
    Temporary(i64),
}

/// Outcome of a get-or-create-or-delete reaction toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Outcome of toggling a saved post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    Unsaved,
}
