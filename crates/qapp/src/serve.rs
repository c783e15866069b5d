// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `qapp serve` command implementation.
//!
//! Opens SQLite storage, builds the router, and serves until SIGINT/SIGTERM.
//! The WAL is checkpointed on the way out.

use std::sync::Arc;

use qapp_config::QappConfig;
use qapp_core::{FeedLimits, ForumStore, PluginAdapter, QappError};
use qapp_gateway::{AppState, ServerConfig, start_server};
use qapp_storage::SqliteStorage;
use tracing::{error, info};

use crate::shutdown;

pub(crate) fn feed_limits(config: &QappConfig) -> FeedLimits {
    FeedLimits {
        random: config.feed.random_size,
        recommended: config.feed.recommended_size,
        mixed: config.feed.mixed_size,
    }
}

/// Run the API server until a shutdown signal arrives.
pub async fn run_serve(config: QappConfig) -> Result<(), QappError> {
    init_tracing(&config.server.log_level);

    info!(
        database = %config.storage.database_path,
        wal_mode = config.storage.wal_mode,
        "starting qapp serve"
    );

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!("storage initialized");

    let store: Arc<dyn ForumStore> = storage.clone();
    let state = AppState::new(store, feed_limits(&config), config.auth.allow_registration);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&server_config, state, cancel).await;

    if let Err(e) = storage.shutdown().await {
        error!(error = %e, "failed to checkpoint database on shutdown");
    }
    served?;

    info!("qapp serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let crates = ["qapp", "qapp_gateway", "qapp_storage", "qapp_core", "tower_http"];
        let directives: Vec<String> = crates.iter().map(|c| format!("{c}={log_level}")).collect();
        EnvFilter::new(format!("{},warn", directives.join(",")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
