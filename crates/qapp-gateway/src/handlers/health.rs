// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use axum::{Json, extract::State, http::StatusCode};
use qapp_core::{HealthStatus, PluginAdapter};

use crate::schema::{ApiRootResponse, HealthResponse};
use crate::server::AppState;

/// GET /
pub async fn index() -> &'static str {
    "QApp is running successfully!"
}

/// GET /api/
pub async fn api_root() -> Json<ApiRootResponse> {
    Json(ApiRootResponse {
        message: "Welcome to QApp API Root".to_string(),
    })
}

/// GET /health
///
/// 200 while storage is healthy or degraded, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "storage unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy".to_string())
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.started_at.elapsed().as_secs(),
        }),
    )
}
