// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns Figment extraction failures into miette diagnostics.
//!
//! Each error names where the bad value came from (a TOML file, an inline
//! string, or a `QAPP_*` variable) and, for TOML input, points at the key.
//! Unknown keys get a Jaro-Winkler "did you mean" against the section's keys.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Name under which inline TOML is passed to [`figment_to_config_errors`].
pub const INLINE_SOURCE: &str = "<inline>";

/// Scores below this are not worth suggesting (`prot` -> `port` is ~0.93).
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Where an offending value was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// A config file, by path.
    File(String),
    /// A `QAPP_<SECTION>_<KEY>` environment variable.
    Environment,
    /// TOML handed over as a string.
    Inline,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{path}"),
            ConfigOrigin::Environment => f.write_str("QAPP_* environment variables"),
            ConfigOrigin::Inline => f.write_str("inline TOML"),
        }
    }
}

/// A configuration problem, ready to render with [`render_errors`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {origin}")]
    #[diagnostic(
        code(qapp::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys, origin))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, if any is close enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted at that position.
        valid_keys: String,
        origin: ConfigOrigin,
        #[label("not a QApp setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` in {origin}: found {found}")]
    #[diagnostic(code(qapp::config::invalid_type), help("{}", type_help(key, expected)))]
    InvalidType {
        /// Dotted path, e.g. `feed.mixed_size`.
        key: String,
        found: String,
        expected: String,
        origin: ConfigOrigin,
        #[label("wrong type for this key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but makes no sense, from `validation`.
    #[error("invalid setting: {message}")]
    #[diagnostic(code(qapp::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(qapp::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str, origin: &ConfigOrigin) -> String {
    let hint = match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    };
    if *origin == ConfigOrigin::Environment {
        format!("{hint}. Variables are named QAPP_<SECTION>_<KEY>, e.g. QAPP_SERVER_PORT")
    } else {
        hint
    }
}

fn type_help(key: &str, expected: &str) -> String {
    let field = key.rsplit('.').next().unwrap_or(key);
    match field {
        "port" => "`port` is a number between 1 and 65535, e.g. `port = 8000`".to_string(),
        f if f.ends_with("_size") => {
            format!("feed sizes are positive whole numbers, e.g. `{f} = 10`")
        }
        "wal_mode" | "allow_registration" => format!("use `{field} = true` or `{field} = false`"),
        _ => format!("expected {expected}"),
    }
}

/// Convert every error inside `err` into a [`ConfigError`].
///
/// `toml_sources` pairs a path (or [`INLINE_SOURCE`]) with its content so
/// TOML errors can carry a span.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let origin = origin_of(&error);
            let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(&origin, &section, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        origin,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (parent, field) = match section.split_last() {
                        Some((field, parent)) => (parent, field.as_str()),
                        None => (&section[..0], ""),
                    };
                    let (span, src) = locate(&origin, parent, field, toml_sources);
                    ConfigError::InvalidType {
                        key: section.join("."),
                        found: actual.to_string(),
                        expected: expected.to_string(),
                        origin,
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn origin_of(error: &figment::Error) -> ConfigOrigin {
    let Some(metadata) = error.metadata.as_ref() else {
        return ConfigOrigin::Inline;
    };
    match &metadata.source {
        Some(figment::Source::File(path)) => ConfigOrigin::File(path.display().to_string()),
        _ if metadata.name.contains("environment") => ConfigOrigin::Environment,
        _ => ConfigOrigin::Inline,
    }
}

/// Span of `field` under `section` in the TOML text `origin` refers to.
fn locate(
    origin: &ConfigOrigin,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let name = match origin {
        ConfigOrigin::File(path) => path.as_str(),
        ConfigOrigin::Inline => INLINE_SOURCE,
        ConfigOrigin::Environment => return (None, None),
    };
    toml_sources
        .iter()
        .find(|(path, _)| path == name)
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, section, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` as a key inside the `[section]` table.
///
/// Only `section[0]` matters since QApp tables are one level deep. The search
/// stops at the next table header, so a key of the same name in a later
/// section is never matched.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let wanted = section.first().map(String::as_str);
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current = Some(header.trim());
        } else if current == wanted
            && let Some((key, _)) = trimmed.split_once('=')
            && key.trim() == field
        {
            let indent = line.len() - line.trim_start().len();
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Closest entry of `valid_keys` to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
