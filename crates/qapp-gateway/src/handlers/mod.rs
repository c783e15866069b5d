// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers, one module per resource.

pub mod feed;
pub mod health;
pub mod posts;
pub mod replies;
pub mod tags;
pub mod users;

use axum::http::HeaderValue;
use axum::response::Response;
use qapp_core::Requester;
use qapp_core::types::Actor;
use uuid::Uuid;

use crate::auth::TEMP_TOKEN_HEADER;
use crate::error::ApiError;
use crate::server::AppState;

/// The identity a reaction or feed is computed for.
///
/// A temp token names a temporary user that is created on first use.
pub(crate) async fn resolve_actor(
    state: &AppState,
    requester: &Requester,
) -> Result<Option<Actor>, ApiError> {
    if let Some(user) = &requester.user {
        return Ok(Some(Actor::Registered(user.id)));
    }
    match requester.temp_token {
        Some(token) => {
            let temp = state.store.get_or_create_temp_user(token).await?;
            Ok(Some(Actor::Temporary(temp.id)))
        }
        None => Ok(None),
    }
}

/// Hand a freshly issued temporary token back to the client.
pub(crate) fn with_issued_token(mut response: Response, token: Option<Uuid>) -> Response {
    if let Some(token) = token
        && let Ok(value) = HeaderValue::from_str(&token.to_string())
    {
        response.headers_mut().insert(TEMP_TOKEN_HEADER, value);
    }
    response
}
