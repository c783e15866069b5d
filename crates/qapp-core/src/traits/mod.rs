// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the HTTP layer and persistence backends.

pub mod adapter;
pub mod store;

pub use adapter::PluginAdapter;
pub use store::ForumStore;
