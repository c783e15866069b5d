// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Homepage feeds.
//!
//! Feeds read identity from the `X-Temp-Token` header only; there is no body.

use axum::{Extension, Json, extract::State};
use qapp_core::{FeedEngine, Requester};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::posts::list_items;
use super::resolve_actor;
use crate::error::ApiError;
use crate::schema::PostListItem;
use crate::server::AppState;

/// `ThreadRng` is not `Send`, so each request seeds its own generator.
fn request_rng() -> StdRng {
    StdRng::from_entropy()
}

/// GET /api/posts/random_feed/
pub async fn random_feed(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostListItem>>, ApiError> {
    let engine = FeedEngine::new(state.store.as_ref(), state.feed_limits);
    let posts = engine.random(&mut request_rng()).await?;
    Ok(Json(list_items(&posts)))
}

/// GET /api/posts/recommended/
pub async fn recommended_feed(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<PostListItem>>, ApiError> {
    let actor = resolve_actor(&state, &requester).await?;
    let engine = FeedEngine::new(state.store.as_ref(), state.feed_limits);
    let posts = engine.recommended(actor, &mut request_rng()).await?;
    Ok(Json(list_items(&posts)))
}

/// GET /api/posts/mixed_feed/
pub async fn mixed_feed(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<PostListItem>>, ApiError> {
    let actor = resolve_actor(&state, &requester).await?;
    let engine = FeedEngine::new(state.store.as_ref(), state.feed_limits);
    let posts = engine.mixed(actor, &mut request_rng()).await?;
    Ok(Json(list_items(&posts)))
}
