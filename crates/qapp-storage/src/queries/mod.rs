// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod posts;
pub mod reactions;
pub mod replies;
pub mod tags;
pub mod temp_users;
pub mod users;
