// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration, profiles, and temporary users.

use axum::{Extension, Json, body::Bytes, extract::State, http::StatusCode};
use qapp_core::Requester;
use qapp_core::types::{NewUser, ProfileUpdate};
use tracing::info;
use uuid::Uuid;

use crate::auth::{generate_token, hash_token};
use crate::error::ApiError;
use crate::extract::{ApiJson, optional_json};
use crate::schema::{
    ProfileResponse, ProfileUpdateRequest, RegisterRequest, RegisteredUserResponse,
    TempUserRequest, TempUserResponse,
};
use crate::server::AppState;
use crate::validate;

/// POST /api/users/
///
/// The raw token appears in this response only.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUserResponse>), ApiError> {
    if !state.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled."));
    }
    let username = validate::username(body.username.as_deref())?;
    let display_name = validate::display_name(body.display_name.as_deref())?;

    let token = generate_token();
    let user = state
        .store
        .create_user(&NewUser {
            username,
            display_name,
            token_hash: hash_token(&token),
        })
        .await?;
    info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUserResponse::new(user, token)),
    ))
}

/// GET /api/profile/
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = requester.registered_user()?;
    let profile = state
        .store
        .get_profile(user.id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(profile.into()))
}

/// PATCH /api/profile/
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = requester.registered_user()?;
    let update = ProfileUpdate {
        display_name: body
            .display_name
            .as_deref()
            .map(|name| validate::display_name(Some(name)))
            .transpose()?,
        avatar: body.avatar.as_deref().map(validate::avatar).transpose()?,
        is_anonymous_by_default: body.is_anonymous_by_default,
    };
    let profile = state.store.update_profile(user.id, &update).await?;
    Ok(Json(profile.into()))
}

/// POST /api/temp-users/
///
/// The body is optional. A supplied `token` must be an unused UUID.
pub async fn create_temp_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TempUserResponse>), ApiError> {
    let body: TempUserRequest = optional_json(&body)?;
    let token = body
        .token
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("token: Must be a valid UUID."))
        })
        .transpose()?;
    let display_name = validate::display_name(body.display_name.as_deref())?;
    let temp = state.store.create_temp_user(token, &display_name).await?;
    Ok((StatusCode::CREATED, Json(temp.into())))
}
