// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use axum::{Json, extract::State};
use qapp_core::types::Tag;

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::server::AppState;

/// GET /api/tags/
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.store.list_tags().await?))
}

/// GET /api/tags/{id}/
pub async fn get_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Tag>, ApiError> {
    state
        .store
        .get_tag(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}
