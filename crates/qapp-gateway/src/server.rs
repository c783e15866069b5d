// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use qapp_core::{FeedLimits, ForumStore, QappError};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::identify;
use crate::error::ApiError;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend.
    pub store: Arc<dyn ForumStore>,
    /// Maximum feed sizes.
    pub feed_limits: FeedLimits,
    /// Whether `POST /api/users/` accepts new registrations.
    pub allow_registration: bool,
    /// Process start time for uptime calculation.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ForumStore>,
        feed_limits: FeedLimits,
        allow_registration: bool,
    ) -> Self {
        Self {
            store,
            feed_limits,
            allow_registration,
            started_at: Instant::now(),
        }
    }
}

/// Server bind configuration (mirrors `ServerConfig` from `qapp-config`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the application router.
///
/// `/` and `/health` are served without identity resolution; everything
/// under `/api/` passes through [`identify`] first.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/", get(handlers::health::api_root))
        .route("/api/users/", post(handlers::users::register))
        .route(
            "/api/profile/",
            get(handlers::users::get_profile).patch(handlers::users::update_profile),
        )
        .route("/api/temp-users/", post(handlers::users::create_temp_user))
        .route("/api/tags/", get(handlers::tags::list_tags))
        .route("/api/tags/{id}/", get(handlers::tags::get_tag))
        .route(
            "/api/posts/",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route("/api/posts/random_feed/", get(handlers::feed::random_feed))
        .route("/api/posts/recommended/", get(handlers::feed::recommended_feed))
        .route("/api/posts/mixed_feed/", get(handlers::feed::mixed_feed))
        .route("/api/posts/saved/", get(handlers::posts::saved_posts))
        .route(
            "/api/posts/{id}/",
            get(handlers::posts::get_post)
                .put(handlers::posts::replace_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route("/api/posts/{id}/react/", post(handlers::posts::react))
        .route("/api/posts/{id}/save/", post(handlers::posts::save))
        .route(
            "/api/replies/",
            get(handlers::replies::list_replies).post(handlers::replies::create_reply),
        )
        .route(
            "/api/replies/{id}/",
            get(handlers::replies::get_reply)
                .put(handlers::replies::replace_reply)
                .patch(handlers::replies::update_reply)
                .delete(handlers::replies::delete_reply),
        )
        .route("/api/replies/{id}/react/", post(handlers::replies::react))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), identify))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(|| async { ApiError::not_found() })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Serve the API until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), QappError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QappError::Internal(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("QApp API listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| QappError::Internal(format!("server error: {e}")))?;

    tracing::info!("QApp API stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8000"));
    }
}
