// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the QApp configuration system.

use std::io::Write;

use qapp_config::diagnostic::{ConfigError, ConfigOrigin};
use qapp_config::model::QappConfig;
use qapp_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_qapp_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9090
log_level = "debug"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[feed]
random_size = 5
recommended_size = 6
mixed_size = 7

[auth]
allow_registration = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.feed.random_size, 5);
    assert_eq!(config.feed.recommended_size, 6);
    assert_eq!(config.feed.mixed_size, 7);
    assert!(!config.auth.allow_registration);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.feed.random_size, 10);
    assert!(config.auth.allow_registration);
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Error output from load_and_validate_str names the unknown key and suggests a fix.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[server]
prot = 8080
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "prot"
                && suggestion.as_deref() == Some("port")
                && valid_keys.contains("host")
                && valid_keys.contains("log_level")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'prot' with suggestion 'port', got: {errors:?}"
    );
}

/// A string where a feed size belongs is an InvalidType pointing at the key.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[feed]
mixed_size = "lots"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::InvalidType { key, origin, span, .. }
            if key == "feed.mixed_size" && *origin == ConfigOrigin::Inline && span.is_some())
    });
    assert!(found, "expected InvalidType for feed.mixed_size, got: {errors:?}");
}

/// ConfigError implements miette::Diagnostic with code and help.
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port, log_level".to_string(),
        origin: ConfigOrigin::Inline,
        span: None,
        src: None,
    };

    let code = error.code().expect("should have diagnostic code").to_string();
    assert_eq!(code, "qapp::config::unknown_key");

    let help = error.help().expect("should have help text").to_string();
    assert!(
        help.contains("did you mean `port`"),
        "help should contain suggestion, got: {help}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let toml = r#"
[server]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("bad port");
    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &errors[0])
        .expect("should render without error");
    assert!(buf.contains("server.port"), "got: {buf}");
    assert!(buf.contains("between 1 and 65535"), "got: {buf}");
}

/// Validation errors are all collected, not just the first.
#[test]
fn validation_collects_every_error() {
    let toml = r#"
[server]
port = 0

[storage]
database_path = "  "

[feed]
recommended_size = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("invalid values should fail");
    assert_eq!(errors.len(), 3, "got: {errors:?}");
}

/// A config file on disk is loaded and validated through the same diagnostics.
#[test]
#[serial]
fn load_from_path_reports_unknown_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[feed]\nmixed_sise = 3").unwrap();

    let errors = load_and_validate_path(file.path()).expect_err("typo should be rejected");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, origin, span, .. }
            if key == "mixed_sise"
                && suggestion.as_deref() == Some("mixed_size")
                && matches!(origin, ConfigOrigin::File(_))
                && span.is_some())
    });
    assert!(found, "expected UnknownKey for mixed_sise, got: {errors:?}");
}

/// QAPP_<SECTION>_<KEY> overrides the file and keeps underscores in key names.
#[test]
#[serial]
fn env_vars_override_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 7000\n\n[feed]\nmixed_size = 4").unwrap();

    // SAFETY: env mutation is confined to #[serial] tests.
    unsafe {
        std::env::set_var("QAPP_SERVER_PORT", "7100");
        std::env::set_var("QAPP_FEED_RANDOM_SIZE", "3");
        std::env::set_var("QAPP_AUTH_ALLOW_REGISTRATION", "false");
    }
    let result = load_config_from_path(file.path());
    unsafe {
        std::env::remove_var("QAPP_SERVER_PORT");
        std::env::remove_var("QAPP_FEED_RANDOM_SIZE");
        std::env::remove_var("QAPP_AUTH_ALLOW_REGISTRATION");
    }

    let config: QappConfig = result.expect("env overrides should merge");
    assert_eq!(config.server.port, 7100);
    assert_eq!(config.feed.random_size, 3);
    assert_eq!(config.feed.mixed_size, 4);
    assert!(!config.auth.allow_registration);
}

/// A badly typed env override is reported against the environment.
#[test]
#[serial]
fn env_type_errors_name_the_environment() {
    // SAFETY: env mutation is confined to #[serial] tests.
    unsafe {
        std::env::set_var("QAPP_SERVER_PORT", "eighty");
    }
    let result = load_and_validate_path(std::path::Path::new("/nonexistent/qapp.toml"));
    unsafe {
        std::env::remove_var("QAPP_SERVER_PORT");
    }

    let errors = result.expect_err("non-numeric port should be rejected");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::InvalidType { key, origin, .. }
            if key == "server.port" && *origin == ConfigOrigin::Environment)
    });
    assert!(found, "expected env InvalidType for server.port, got: {errors:?}");
}

/// Missing config files are silently skipped.
#[test]
#[serial]
fn missing_config_file_yields_defaults() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/qapp.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.server.host, "127.0.0.1");
}
