// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for QApp.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed queries for users,
//! temporary users, tags, posts, replies, reactions, and saved posts.
//!
//! All writes are serialized through the one background thread owned by
//! [`Database`]. Query modules accept `&Database` and go through
//! `connection().call()`; do not open additional connections for writes.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
