// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for QApp.

use thiserror::Error;

/// The primary error type used across the store trait, the feed engine, and the gateway.
#[derive(Debug, Error)]
pub enum QappError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Request data failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness constraint would be violated (duplicate username, etc.).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but do not grant access to the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QappError {
    /// Shorthand for a [`QappError::NotFound`] on a numeric id.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        QappError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
