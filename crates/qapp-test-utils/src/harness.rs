// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end API testing.
//!
//! `TestHarness` assembles the real router on top of a temp SQLite database.
//! Requests go through `tower::ServiceExt::oneshot`, so the full middleware
//! stack runs exactly as it does behind a listener.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use qapp_config::model::StorageConfig;
use qapp_core::{FeedLimits, ForumStore, QappError};
use qapp_gateway::{AppState, build_router};
use qapp_storage::SqliteStorage;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    feed_limits: FeedLimits,
    allow_registration: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            feed_limits: FeedLimits::default(),
            allow_registration: true,
        }
    }

    /// Override the feed sizes.
    pub fn with_feed_limits(mut self, limits: FeedLimits) -> Self {
        self.feed_limits = limits;
        self
    }

    /// Enable or disable `POST /api/users/`.
    pub fn with_registration(mut self, allow: bool) -> Self {
        self.allow_registration = allow;
        self
    }

    /// Create the temp database, run migrations, and build the router.
    pub async fn build(self) -> Result<TestHarness, QappError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| QappError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let store: Arc<dyn ForumStore> = storage.clone();
        let router = build_router(AppState::new(
            store,
            self.feed_limits,
            self.allow_registration,
        ));

        Ok(TestHarness {
            router,
            storage,
            _temp_dir: temp_dir,
        })
    }
}

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, a JSON string for non-JSON bodies, or `null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// Value of a response header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A router backed by a temp SQLite database.
pub struct TestHarness {
    /// The application router.
    pub router: Router,
    /// Store behind the router, for seeding and direct assertions.
    pub storage: Arc<SqliteStorage>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default settings.
    pub async fn new() -> Result<Self, QappError> {
        Self::builder().build().await
    }

    /// Send one request through the router.
    ///
    /// A `Some` body is sent as JSON. Panics on transport failures, which
    /// cannot happen for an in-process router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request(Method::GET, uri, None, headers).await
    }

    pub async fn post(&self, uri: &str, body: Value, headers: &[(&str, &str)]) -> TestResponse {
        self.request(Method::POST, uri, Some(body), headers).await
    }

    /// Register `username` through the API and return its bearer token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post("/api/users/", json!({ "username": username }), &[])
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("registration returns a token")
            .to_string()
    }

    /// Create a post as `headers` and return its id.
    pub async fn create_post(&self, body: Value, headers: &[(&str, &str)]) -> i64 {
        let response = self.post("/api/posts/", body, headers).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().expect("post id")
    }
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_serves_root() {
        let harness = TestHarness::new().await.unwrap();
        let response = harness.get("/", &[]).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Value::String("QApp is running successfully!".into()));
    }

    #[tokio::test]
    async fn register_returns_token() {
        let harness = TestHarness::new().await.unwrap();
        let token = harness.register("dana").await;
        assert_eq!(token.len(), 64);
    }
}
