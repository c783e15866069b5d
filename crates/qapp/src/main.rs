// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QApp - a forum for problems and journeys.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qapp_config::QappConfig;

mod admin;
mod serve;
mod shutdown;

/// QApp - a forum for problems and journeys.
#[derive(Parser, Debug)]
#[command(name = "qapp", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Create the database if needed and apply pending migrations.
    Migrate,
    /// Register a user and print their API token.
    CreateUser {
        username: String,
        #[arg(long, default_value = "")]
        display_name: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> QappConfig {
    let loaded = match path {
        Some(path) => qapp_config::load_and_validate_path(path),
        None => qapp_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            qapp_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Migrate) => admin::run_migrate(&config).await,
        Some(Commands::CreateUser {
            username,
            display_name,
        }) => admin::run_create_user(&config, &username, &display_name).await,
        Some(Commands::Config) => admin::run_config(&config),
        None => {
            println!("qapp: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
