// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response bodies.
//!
//! Response shapes select exactly the fields clients see; storage records
//! carry more than any one view exposes.

use qapp_core::types::{
    PostRecord, PostType, Profile, ReplyRecord, Tag, TemporaryUser, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Responses ---

/// Body of `GET /api/`.
#[derive(Debug, Serialize)]
pub struct ApiRootResponse {
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Outcome of a toggle endpoint, e.g. `{"status": "added"}`.
#[derive(Debug, Serialize)]
pub struct StatusResponse<T: Serialize> {
    pub status: T,
}

#[derive(Debug, Serialize)]
pub struct TempUserResponse {
    pub token: Uuid,
    pub display_name: String,
    pub created_at: String,
}

impl From<TemporaryUser> for TempUserResponse {
    fn from(temp: TemporaryUser) -> Self {
        Self {
            token: temp.token,
            display_name: temp.display_name,
            created_at: temp.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub display_name: String,
    pub avatar: String,
    pub is_anonymous_by_default: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            display_name: profile.display_name,
            avatar: profile.avatar,
            is_anonymous_by_default: profile.is_anonymous_by_default,
        }
    }
}

/// Returned once on registration. The token is not recoverable afterwards.
#[derive(Debug, Serialize)]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub username: String,
    pub token: String,
    pub profile: ProfileResponse,
}

impl RegisteredUserResponse {
    pub fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            username: user.username,
            token,
            profile: user.profile.into(),
        }
    }
}

/// A post as shown in lists and feeds.
#[derive(Debug, Serialize)]
pub struct PostListItem {
    pub id: i64,
    pub title: String,
    pub post_type: PostType,
    pub author_display: String,
    pub hide_identity: bool,
    pub tags: Vec<Tag>,
    pub reaction_count: i64,
    pub created_at: String,
}

impl From<&PostRecord> for PostListItem {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            post_type: post.post_type,
            author_display: post.author_display_name(),
            hide_identity: post.hide_identity,
            tags: post.tags.clone(),
            reaction_count: post.reaction_count,
            created_at: post.created_at.clone(),
        }
    }
}

/// A single post.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub post_type: PostType,
    pub author_display: String,
    pub hide_identity: bool,
    pub tags: Vec<Tag>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&PostRecord> for PostDetail {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            description: post.description.clone(),
            post_type: post.post_type,
            author_display: post.author_display_name(),
            hide_identity: post.hide_identity,
            tags: post.tags.clone(),
            created_at: post.created_at.clone(),
            updated_at: post.updated_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub id: i64,
    pub post: i64,
    pub content: String,
    pub author_display: String,
    pub hide_identity: bool,
    pub created_at: String,
}

impl From<&ReplyRecord> for ReplyResponse {
    fn from(reply: &ReplyRecord) -> Self {
        Self {
            id: reply.id,
            post: reply.post_id,
            content: reply.content.clone(),
            author_display: reply.author_display_name(),
            hide_identity: reply.hide_identity,
            created_at: reply.created_at.clone(),
        }
    }
}

// --- Requests ---
//
// Required fields are `Option` so a missing field yields a field-level
// message instead of a generic deserialization error.

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub is_anonymous_by_default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TempUserRequest {
    /// Client-chosen token; generated when absent.
    pub token: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub post_type: Option<PostType>,
    pub tag: Option<String>,
}

/// Body of post create, update, and replace.
#[derive(Debug, Default, Deserialize)]
pub struct PostRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_type: Option<PostType>,
    pub tags: Option<Vec<String>>,
    pub hide_identity: Option<bool>,
    pub temp_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplyListQuery {
    pub post: Option<i64>,
}

/// Body of reply create, update, and replace.
#[derive(Debug, Default, Deserialize)]
pub struct ReplyRequest {
    pub post: Option<i64>,
    pub content: Option<String>,
    pub hide_identity: Option<bool>,
    pub temp_token: Option<String>,
}

/// Body of the react endpoints. Everything is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ReactRequest {
    pub reaction: Option<String>,
    pub temp_token: Option<String>,
}
