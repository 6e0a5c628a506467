// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rollcall doctor` command implementation.
//!
//! Runs diagnostic checks against the local configuration and the remote
//! attendance API to surface setup problems before a trainer hits them.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use rollcall_client::RestAdapter;
use rollcall_config::model::RollcallConfig;
use rollcall_core::{Adapter, HealthStatus};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `rollcall doctor` command.
///
/// Returns the number of failed checks. With `--deep`, also reports
/// allocator statistics. With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &RollcallConfig,
    config_path: Option<&Path>,
    deep: bool,
    plain: bool,
) -> usize {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = vec![
        check_config(config_path),
        check_token(config),
        check_api(config).await,
    ];
    if deep {
        results.push(check_memory_baseline());
    }

    print!("{}", render(&results, use_color, deep));
    results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count()
}

fn render(results: &[CheckResult], use_color: bool, deep: bool) -> String {
    use colored::Colorize;

    let mut out = String::new();
    out.push('\n');
    out.push_str("  rollcall doctor\n");
    out.push_str(&format!("  {}\n", "-".repeat(50)));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let line = match (&result.status, use_color) {
            (CheckStatus::Pass, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✓".green(),
                result.name,
                result.message
            ),
            (CheckStatus::Pass, false) => format!(
                "    [OK]   {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
            (CheckStatus::Warn, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "!".yellow(),
                result.name,
                result.message.yellow()
            ),
            (CheckStatus::Warn, false) => format!(
                "    [WARN] {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
            (CheckStatus::Fail, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✗".red(),
                result.name,
                result.message.red()
            ),
            (CheckStatus::Fail, false) => format!(
                "    [FAIL] {:<20} {} ({duration_ms}ms)",
                result.name, result.message
            ),
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.push('\n');
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        out.push_str(&format!("  {issues} {issue_word} found.\n"));
        if !deep {
            out.push_str("  Run with --deep for detailed diagnostics.\n");
        }
    } else {
        out.push_str("  All checks passed.\n");
    }
    out.push('\n');
    out
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => rollcall_config::load_and_validate_path(path),
        None => rollcall_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Warn when requests would go out without a bearer token.
fn check_token(config: &RollcallConfig) -> CheckResult {
    let start = Instant::now();
    match config.api.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => {
            CheckResult::new("API token", CheckStatus::Pass, "configured", start)
        }
        _ => CheckResult::new(
            "API token",
            CheckStatus::Warn,
            "not set (api.token or ROLLCALL_API_TOKEN)",
            start,
        ),
    }
}

/// Check the API base URL answers at all.
async fn check_api(config: &RollcallConfig) -> CheckResult {
    let start = Instant::now();
    let adapter = match RestAdapter::new(&config.api) {
        Ok(adapter) => adapter,
        Err(e) => {
            return CheckResult::new("Attendance API", CheckStatus::Fail, e.to_string(), start);
        }
    };

    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Attendance API",
            CheckStatus::Pass,
            format!("reachable at {}", config.api.base_url),
            start,
        ),
        Ok(HealthStatus::Degraded(msg)) => {
            CheckResult::new("Attendance API", CheckStatus::Warn, msg, start)
        }
        Ok(HealthStatus::Unhealthy(msg)) => {
            CheckResult::new("Attendance API", CheckStatus::Fail, msg, start)
        }
        Err(e) => CheckResult::new("Attendance API", CheckStatus::Fail, e.user_message(), start),
    }
}

/// Deep check: memory baseline via jemalloc.
fn check_memory_baseline() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);

        CheckResult::new(
            "Memory baseline",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Warn,
            "jemalloc not available on MSVC",
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: CheckStatus) -> CheckResult {
        CheckResult {
            name: "Check".to_string(),
            status,
            message: "msg".to_string(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn plain_render_lists_each_check() {
        let out = render(
            &[result(CheckStatus::Pass), result(CheckStatus::Fail)],
            false,
            false,
        );
        assert!(out.contains("[OK]   Check"));
        assert!(out.contains("[FAIL] Check"));
        assert!(out.contains("1 issue found."));
        assert!(out.contains("--deep"));
    }

    #[test]
    fn all_passing_checks_say_so() {
        let out = render(&[result(CheckStatus::Pass)], false, true);
        assert!(out.contains("All checks passed."));
    }

    #[test]
    fn missing_token_warns() {
        let config = RollcallConfig::default();
        let result = check_token(&config);
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn explicit_config_path_is_checked() {
        let result = check_config(Some(Path::new("/nonexistent/rollcall-doctor-test.toml")));
        // A missing file falls back to defaults, which are valid.
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn unreachable_api_fails() {
        let mut config = RollcallConfig::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        config.api.timeout_secs = 2;
        let result = check_api(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }

    #[test]
    fn memory_baseline_reports() {
        let result = check_memory_baseline();
        assert!(result.status == CheckStatus::Pass || result.status == CheckStatus::Warn);
    }
}
