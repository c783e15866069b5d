// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post CRUD, reactions, and saves.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qapp_core::Requester;
use qapp_core::types::{NewPost, PostFilter, PostRecord, PostUpdate, SaveOutcome, ToggleOutcome};
use tracing::{debug, info};

use super::{resolve_actor, with_issued_token};
use crate::auth::parse_temp_token;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, optional_json};
use crate::schema::{
    PostDetail, PostListItem, PostListQuery, PostRequest, ReactRequest, StatusResponse,
};
use crate::server::AppState;
use crate::validate;

pub(crate) fn list_items(posts: &[PostRecord]) -> Vec<PostListItem> {
    posts.iter().map(PostListItem::from).collect()
}

async fn load_post(state: &AppState, id: i64) -> Result<PostRecord, ApiError> {
    state.store.get_post(id).await?.ok_or_else(ApiError::not_found)
}

/// GET /api/posts/
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> Result<Json<Vec<PostListItem>>, ApiError> {
    let filter = PostFilter {
        post_type: query.post_type,
        tag: query.tag.filter(|t| !t.trim().is_empty()),
    };
    let posts = state.store.list_posts(&filter).await?;
    Ok(Json(list_items(&posts)))
}

/// POST /api/posts/
///
/// Requests without any identity are attributed to a fresh temporary user
/// whose token is returned in the `X-Temp-Token` header.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<PostRequest>,
) -> Result<Response, ApiError> {
    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    let post = NewPost {
        title: validate::title(body.title.as_deref())?,
        description: validate::text("description", body.description.as_deref())?,
        post_type: body.post_type.unwrap_or_default(),
        tags: validate::tags(body.tags.as_deref().unwrap_or_default())?,
        hide_identity: requester.hide_identity(body.hide_identity),
        author: requester.new_author(),
    };

    let created = state.store.create_post(&post).await?;
    info!(
        post_id = created.record.id,
        issued_token = created.issued_token.is_some(),
        "post created"
    );

    let response = (StatusCode::CREATED, Json(PostDetail::from(&created.record))).into_response();
    Ok(with_issued_token(response, created.issued_token))
}

/// GET /api/posts/{id}/
pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = load_post(&state, id).await?;
    Ok(Json(PostDetail::from(&post)))
}

/// PUT /api/posts/{id}/
pub async fn replace_post(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PostRequest>,
) -> Result<Json<PostDetail>, ApiError> {
    modify_post(&state, &requester, id, body, false).await
}

/// PATCH /api/posts/{id}/
pub async fn update_post(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PostRequest>,
) -> Result<Json<PostDetail>, ApiError> {
    modify_post(&state, &requester, id, body, true).await
}

async fn modify_post(
    state: &AppState,
    requester: &Requester,
    id: i64,
    body: PostRequest,
    partial: bool,
) -> Result<Json<PostDetail>, ApiError> {
    let post = load_post(state, id).await?;
    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    post.author.ensure_owned_by(&requester)?;

    let title = match (&body.title, partial) {
        (None, true) => None,
        (title, _) => Some(validate::title(title.as_deref())?),
    };
    let description = match (&body.description, partial) {
        (None, true) => None,
        (description, _) => Some(validate::text("description", description.as_deref())?),
    };
    let update = PostUpdate {
        title,
        description,
        post_type: body.post_type,
        tags: body.tags.as_deref().map(validate::tags).transpose()?,
        hide_identity: body.hide_identity,
    };

    let post = state.store.update_post(id, &update).await?;
    debug!(post_id = id, partial, "post updated");
    Ok(Json(PostDetail::from(&post)))
}

/// DELETE /api/posts/{id}/
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let post = load_post(&state, id).await?;
    post.author.ensure_owned_by(&requester)?;
    state.store.delete_post(id).await?;
    info!(post_id = id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/{id}/react/
///
/// Adds the caller's reaction, or removes it if already present.
pub async fn react(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    body: Bytes,
) -> Result<Json<StatusResponse<ToggleOutcome>>, ApiError> {
    load_post(&state, id).await?;
    let body: ReactRequest = optional_json(&body)?;
    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    let actor = resolve_actor(&state, &requester)
        .await?
        .ok_or_else(|| ApiError::bad_request("temp_token required"))?;

    let status = state.store.toggle_post_reaction(id, actor).await?;
    debug!(post_id = id, ?actor, %status, "post reaction toggled");
    Ok(Json(StatusResponse { status }))
}

/// POST /api/posts/{id}/save/
pub async fn save(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StatusResponse<SaveOutcome>>, ApiError> {
    load_post(&state, id).await?;
    let user = requester
        .user
        .as_ref()
        .ok_or_else(|| ApiError::unauthorized("Authentication required to save posts."))?;

    let status = state.store.toggle_saved(id, user.id).await?;
    debug!(post_id = id, user_id = user.id, %status, "save toggled");
    Ok(Json(StatusResponse { status }))
}

/// GET /api/posts/saved/
pub async fn saved_posts(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<PostListItem>>, ApiError> {
    let user = requester.registered_user()?;
    let posts = state.store.saved_posts(user.id).await?;
    Ok(Json(list_items(&posts)))
}
