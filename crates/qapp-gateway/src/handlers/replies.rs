// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply CRUD and reactions.

use std::str::FromStr;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qapp_core::Requester;
use qapp_core::types::{NewReply, ReplyReactionKind, ReplyRecord, ReplyUpdate, ToggleOutcome};
use tracing::{debug, info};

use super::{resolve_actor, with_issued_token};
use crate::auth::parse_temp_token;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, optional_json};
use crate::schema::{ReactRequest, ReplyListQuery, ReplyRequest, ReplyResponse, StatusResponse};
use crate::server::AppState;
use crate::validate;

async fn load_reply(state: &AppState, id: i64) -> Result<ReplyRecord, ApiError> {
    state.store.get_reply(id).await?.ok_or_else(ApiError::not_found)
}

/// GET /api/replies/
pub async fn list_replies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReplyListQuery>,
) -> Result<Json<Vec<ReplyResponse>>, ApiError> {
    let replies = state.store.list_replies(query.post).await?;
    Ok(Json(replies.iter().map(ReplyResponse::from).collect()))
}

/// POST /api/replies/
pub async fn create_reply(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<ReplyRequest>,
) -> Result<Response, ApiError> {
    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    let post_id = body
        .post
        .ok_or_else(|| ApiError::bad_request("post: This field is required."))?;
    let reply = NewReply {
        post_id,
        content: validate::text("content", body.content.as_deref())?,
        hide_identity: requester.hide_identity(body.hide_identity),
        author: requester.new_author(),
    };

    let created = state.store.create_reply(&reply).await?;
    info!(reply_id = created.record.id, post_id, "reply created");

    let response =
        (StatusCode::CREATED, Json(ReplyResponse::from(&created.record))).into_response();
    Ok(with_issued_token(response, created.issued_token))
}

/// GET /api/replies/{id}/
pub async fn get_reply(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let reply = load_reply(&state, id).await?;
    Ok(Json(ReplyResponse::from(&reply)))
}

/// PUT /api/replies/{id}/
pub async fn replace_reply(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReplyRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    modify_reply(&state, &requester, id, body, false).await
}

/// PATCH /api/replies/{id}/
pub async fn update_reply(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReplyRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    modify_reply(&state, &requester, id, body, true).await
}

/// Replies cannot move between posts; a `post` field is ignored.
async fn modify_reply(
    state: &AppState,
    requester: &Requester,
    id: i64,
    body: ReplyRequest,
    partial: bool,
) -> Result<Json<ReplyResponse>, ApiError> {
    let reply = load_reply(state, id).await?;
    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    reply.author.ensure_owned_by(&requester)?;

    let content = match (&body.content, partial) {
        (None, true) => None,
        (content, _) => Some(validate::text("content", content.as_deref())?),
    };
    let update = ReplyUpdate {
        content,
        hide_identity: body.hide_identity,
    };

    let reply = state.store.update_reply(id, &update).await?;
    debug!(reply_id = id, partial, "reply updated");
    Ok(Json(ReplyResponse::from(&reply)))
}

/// DELETE /api/replies/{id}/
pub async fn delete_reply(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let reply = load_reply(&state, id).await?;
    reply.author.ensure_owned_by(&requester)?;
    state.store.delete_reply(id).await?;
    info!(reply_id = id, "reply deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/replies/{id}/react/
///
/// Repeating the same reaction removes it; a different one replaces it.
pub async fn react(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    body: Bytes,
) -> Result<Json<StatusResponse<ToggleOutcome>>, ApiError> {
    load_reply(&state, id).await?;
    let body: ReactRequest = optional_json(&body)?;
    let kind = body
        .reaction
        .as_deref()
        .and_then(|r| ReplyReactionKind::from_str(r).ok())
        .ok_or_else(|| ApiError::bad_request("invalid reaction"))?;

    let requester = requester.with_body_token(parse_temp_token(body.temp_token.as_deref())?);
    let actor = resolve_actor(&state, &requester)
        .await?
        .ok_or_else(|| ApiError::bad_request("temp_token required"))?;

    let status = state.store.toggle_reply_reaction(id, actor, kind).await?;
    debug!(reply_id = id, ?actor, %kind, %status, "reply reaction toggled");
    Ok(Json(StatusResponse { status }))
}
