// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./qapp.toml` > `~/.config/qapp/qapp.toml` > `/etc/qapp/qapp.toml`,
//! with environment variable overrides via the `QAPP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and not ours to box

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QappConfig;

/// Config sections that `QAPP_<SECTION>_<KEY>` variables map onto.
const SECTIONS: &[&str] = &["server", "storage", "feed", "auth"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/qapp/qapp.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "qapp.toml";

/// Per-user config file under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("qapp").join("qapp.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/qapp/qapp.toml` (system-wide)
/// 3. `~/.config/qapp/qapp.toml` (user XDG config)
/// 4. `./qapp.toml` (local directory)
/// 5. `QAPP_*` environment variables
pub fn load_config() -> Result<QappConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QappConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QappConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QappConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QappConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(QappConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map `QAPP_FEED_RANDOM_SIZE` to `feed.random_size`.
///
/// Only the first underscore after a known section becomes a dot, so keys
/// containing underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("QAPP_").map(|key| section_key(key.as_str()).into())
}

/// Figment hands over the stripped name in its original case.
fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_onto_sections() {
        assert_eq!(section_key("SERVER_PORT"), "server.port");
        assert_eq!(section_key("FEED_RANDOM_SIZE"), "feed.random_size");
        assert_eq!(section_key("auth_allow_registration"), "auth.allow_registration");
        assert_eq!(section_key("STORAGE_WAL_MODE"), "storage.wal_mode");
    }

    #[test]
    fn unknown_sections_pass_through_lowercased() {
        assert_eq!(section_key("SERVERPORT"), "serverport");
        assert_eq!(section_key("OTHER_KEY"), "other_key");
    }
}
