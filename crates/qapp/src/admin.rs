// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot administrative commands: `migrate`, `create-user`, `config`.

use qapp_config::QappConfig;
use qapp_core::types::{NewUser, User};
use qapp_core::{ForumStore, PluginAdapter, QappError};
use qapp_gateway::{ApiError, generate_token, hash_token, validate};
use qapp_storage::SqliteStorage;

async fn open_storage(config: &QappConfig) -> Result<SqliteStorage, QappError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

/// `qapp migrate`
///
/// Opening the database applies any pending migrations.
pub async fn run_migrate(config: &QappConfig) -> Result<(), QappError> {
    let storage = open_storage(config).await?;
    storage.shutdown().await?;
    println!("database ready at {}", config.storage.database_path);
    Ok(())
}

/// Register a user, returning it with its raw token.
pub(crate) async fn create_user(
    store: &dyn ForumStore,
    username: &str,
    display_name: &str,
) -> Result<(User, String), QappError> {
    let invalid = |e: ApiError| QappError::Validation(e.detail().to_string());
    let username = validate::username(Some(username)).map_err(invalid)?;
    let display_name = validate::display_name(Some(display_name)).map_err(invalid)?;
    let token = generate_token();
    let user = store
        .create_user(&NewUser {
            username,
            display_name,
            token_hash: hash_token(&token),
        })
        .await?;
    Ok((user, token))
}

/// `qapp create-user <username> [--display-name]`
///
/// The token is printed once and cannot be recovered.
pub async fn run_create_user(
    config: &QappConfig,
    username: &str,
    display_name: &str,
) -> Result<(), QappError> {
    let storage = open_storage(config).await?;
    let created = create_user(&storage, username, display_name).await;
    storage.shutdown().await?;
    let (user, token) = created?;

    println!("created user `{}` (id {})", user.username, user.id);
    println!("token: {token}");
    println!("store this token now; it will not be shown again");
    Ok(())
}

/// `qapp config`
pub fn run_config(config: &QappConfig) -> Result<(), QappError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| QappError::Config(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
