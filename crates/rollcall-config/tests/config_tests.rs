// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Rollcall configuration system.

use std::io::Write;

use rollcall_config::diagnostic::ConfigError;
use rollcall_config::loader::load_config_from_path;
use rollcall_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_rollcall_config() {
    let toml = r#"
[api]
base_url = "https://gym.example.com/api"
token = "secret"
timeout_secs = 10
max_retries = 2
retry_delay_ms = 250

[attendance]
lock_after_batch = false
default_notes = "marked by trainer"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.api.base_url, "https://gym.example.com/api");
    assert_eq!(config.api.token.as_deref(), Some("secret"));
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.api.max_retries, 2);
    assert_eq!(config.api.retry_delay_ms, 250);
    assert!(!config.attendance.lock_after_batch);
    assert_eq!(
        config.attendance.default_notes.as_deref(),
        Some("marked by trainer")
    );
    assert_eq!(config.logging.level, "debug");
}

/// Empty input falls back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    assert_eq!(config.api.base_url, "http://localhost:5000/api");
    assert!(config.api.token.is_none());
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.attendance.lock_after_batch);
    assert_eq!(config.logging.level, "info");
}

/// Unknown key in [attendance] is reported with a suggestion.
#[test]
fn unknown_attendance_key_suggests_correction() {
    let toml = r#"
[attendance]
lock_afer_batch = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "lock_afer_batch" && suggestion.as_deref() == Some("lock_after_batch")
        )
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[payments]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[api]
timeout_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string timeout");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("timeout_secs"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after deserialization.
#[test]
fn validation_errors_are_returned() {
    let toml = r#"
[api]
base_url = "ftp://gym.example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("ftp scheme is invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
}

/// A config file on disk loads through the path loader.
#[test]
fn loads_from_explicit_path() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(file, "[logging]\nlevel = \"warn\"").expect("write config");

    let config = load_and_validate_path(file.path()).expect("file config is valid");
    assert_eq!(config.logging.level, "warn");
}

/// `ROLLCALL_*` variables override file values, including keys with underscores.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[api]
base_url = "https://file.example.com"
"#,
        )?;
        jail.set_env("ROLLCALL_API_BASE_URL", "https://env.example.com");
        jail.set_env("ROLLCALL_API_TOKEN", "from-env");
        jail.set_env("ROLLCALL_ATTENDANCE_LOCK_AFTER_BATCH", "false");

        let config = load_config_from_path(std::path::Path::new("custom.toml"))?;
        assert_eq!(config.api.base_url, "https://env.example.com");
        assert_eq!(config.api.token.as_deref(), Some("from-env"));
        assert!(!config.attendance.lock_after_batch);
        Ok(())
    });
}
