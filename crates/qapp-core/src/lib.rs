// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for QApp, a forum for problems and journeys.
//!
//! This crate provides the domain types, the error type, the authorship
//! rules for registered and temporary users, the feed engine, and the
//! [`ForumStore`] trait that persistence backends implement.

pub mod error;
pub mod feed;
pub mod identity;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QappError;
pub use feed::{FeedEngine, FeedLimits};
pub use identity::{ANONYMOUS, Authorship, Requester};
pub use traits::{ForumStore, PluginAdapter};
pub use types::HealthStatus;
