// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for QApp integration tests.
//!
//! [`TestHarness`] wires a temp SQLite store into the real router so tests
//! can drive the HTTP API in-process without binding a socket.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TestResponse, bearer};
