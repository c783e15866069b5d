// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request identity resolution.
//!
//! Two identities can accompany a request:
//! 1. Bearer token (`Authorization: Bearer <token>`) naming a registered user
//! 2. Temporary token (`X-Temp-Token: <uuid>`) naming an anonymous poster
//!
//! Neither is required. A bearer token that matches no user is rejected with
//! 401, and a temporary token that is not a UUID is rejected with 400.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use qapp_core::Requester;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AppState;

/// Header carrying the temporary-user token, on requests and on responses
/// that issued a fresh one.
pub const TEMP_TOKEN_HEADER: &str = "x-temp-token";

/// A new random API token: 32 bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest of an API token, as stored.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Parse a temporary token. An empty string counts as absent.
pub fn parse_temp_token(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| ApiError::bad_request("invalid temp_token")),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

fn header_temp_token(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    match headers.get(TEMP_TOKEN_HEADER) {
        None => Ok(None),
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ApiError::bad_request("invalid temp_token"))?;
            parse_temp_token(Some(raw))
        }
    }
}

/// Middleware that resolves the caller and stores a [`Requester`] in the
/// request extensions for handlers to pick up.
pub async fn identify(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let temp_token = header_temp_token(request.headers())?;
    let token_hash = bearer_token(request.headers()).map(hash_token);
    let user = match token_hash {
        Some(token_hash) => {
            let user = state.store.user_by_token_hash(&token_hash).await?;
            match user {
                Some(user) => Some(user),
                None => {
                    tracing::debug!("bearer token matched no user");
                    return Err(ApiError::unauthorized("Invalid token."));
                }
            }
        }
        None => None,
    };

    request
        .extensions_mut()
        .insert(Requester { user, temp_token });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn generated_tokens_are_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_stable_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn temp_token_parsing() {
        let token = Uuid::new_v4();
        assert_eq!(parse_temp_token(Some(&token.to_string())).unwrap(), Some(token));
        assert_eq!(parse_temp_token(Some("")).unwrap(), None);
        assert_eq!(parse_temp_token(None).unwrap(), None);
        let err = parse_temp_token(Some("not-a-uuid")).unwrap_err();
        assert_eq!(err.detail(), "invalid temp_token");
    }

    #[test]
    fn bearer_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn header_temp_token_is_validated() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_temp_token(&headers).unwrap(), None);
        headers.insert(TEMP_TOKEN_HEADER, HeaderValue::from_static("garbage"));
        assert!(header_temp_token(&headers).is_err());
    }
}
