// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for QApp.
//!
//! Handlers talk to storage only through [`qapp_core::ForumStore`], so the
//! router can be driven in-process against any backend. Every response body
//! is JSON except `GET /`; errors render as `{"detail": "..."}`.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod schema;
pub mod server;
pub mod validate;

pub use auth::{TEMP_TOKEN_HEADER, generate_token, hash_token};
pub use error::ApiError;
pub use server::{AppState, ServerConfig, build_router, start_server};
