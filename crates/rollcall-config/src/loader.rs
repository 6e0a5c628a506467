// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rollcall.toml` > `~/.config/rollcall/rollcall.toml` >
//! `/etc/rollcall/rollcall.toml` with environment variable overrides via `ROLLCALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RollcallConfig;

/// File name looked up in every config directory.
pub const CONFIG_FILE: &str = "rollcall.toml";

const SYSTEM_CONFIG: &str = "/etc/rollcall/rollcall.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rollcall").join(CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rollcall/rollcall.toml`
/// 3. `~/.config/rollcall/rollcall.toml`
/// 4. `./rollcall.toml`
/// 5. `ROLLCALL_*` environment variables
pub fn load_config() -> Result<RollcallConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<RollcallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RollcallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscores inside key
/// names survive: `ROLLCALL_API_BASE_URL` must become `api.base_url`, not
/// `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("ROLLCALL_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("api_", "api.", 1)
            .replacen("attendance_", "attendance.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}

/// Source paths and contents of the TOML files that exist, for diagnostics.
pub fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(user) = user_config_path() {
        candidates.push(user);
    }
    candidates.push(
        std::env::current_dir()
            .map(|d| d.join(CONFIG_FILE))
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE)),
    );

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
