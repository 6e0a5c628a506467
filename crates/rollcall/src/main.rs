// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rollcall - class session attendance from the command line.
//!
//! This is the binary entry point: it loads configuration, installs the
//! tracing subscriber, and dispatches subcommands over the REST adapter.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod doctor;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rollcall_attendance::{BatchOptions, Ports};
use rollcall_client::RestAdapter;
use rollcall_config::RollcallConfig;
use rollcall_core::{ClassId, RollcallError, SessionDate, SystemClock, UserId};

use crate::commands::{Context, MarkArgs, OutputFormat};

/// Rollcall - class session attendance.
#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the session dates of a class.
    Sessions { class_id: String },

    /// Show the reconciled roster of one session.
    Roster {
        class_id: String,
        /// Session date (YYYY-MM-DD).
        #[arg(long, conflicts_with = "session", required_unless_present = "session")]
        date: Option<SessionDate>,
        /// Session number, resolved to a date from the schedule.
        #[arg(long)]
        session: Option<u32>,
    },

    /// Mark a session for several students at once.
    Mark {
        class_id: String,
        #[arg(long)]
        session: u32,
        /// Override the date resolved from the schedule.
        #[arg(long)]
        date: Option<SessionDate>,
        /// Comma-separated user ids to mark present.
        #[arg(long, value_delimiter = ',')]
        present: Vec<String>,
        /// Comma-separated user ids to mark absent.
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        /// Lock the date afterwards.
        #[arg(long, conflicts_with = "no_lock")]
        lock: bool,
        /// Leave the date open afterwards.
        #[arg(long)]
        no_lock: bool,
    },

    /// Finalize attendance for a session date.
    Lock {
        class_id: String,
        #[arg(long)]
        date: SessionDate,
    },

    /// Check a student in for today's session.
    CheckIn {
        class_id: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        session: u32,
        /// Must be today; defaults to today.
        #[arg(long)]
        date: Option<SessionDate>,
    },

    /// Diagnose configuration and API connectivity.
    Doctor {
        /// Include allocator statistics.
        #[arg(long)]
        deep: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => rollcall_config::load_and_validate_path(path),
        None => rollcall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            rollcall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    tracing::debug!(base_url = %config.api.base_url, "config loaded");

    if let Commands::Doctor { deep } = cli.command {
        let failures = doctor::run_doctor(&config, cli.config.as_deref(), deep, cli.plain).await;
        std::process::exit(if failures > 0 { 1 } else { 0 });
    }

    if let Err(e) = run(cli, &config).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &RollcallConfig) -> Result<(), RollcallError> {
    let adapter = Arc::new(RestAdapter::new(&config.api)?);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text {
            color: !cli.plain && std::io::stdout().is_terminal(),
        }
    };
    let ctx = Context {
        ports: Ports::from_adapter(adapter),
        options: BatchOptions::from(&config.attendance),
        clock: Arc::new(SystemClock),
        format,
    };

    let mut stdout = std::io::stdout().lock();
    let out = &mut stdout;

    match cli.command {
        Commands::Sessions { class_id } => {
            commands::sessions(&ctx, &ClassId::from(class_id), out).await
        }
        Commands::Roster {
            class_id,
            date,
            session,
        } => commands::roster(&ctx, &ClassId::from(class_id), date, session, out).await,
        Commands::Mark {
            class_id,
            session,
            date,
            present,
            absent,
            lock,
            no_lock,
        } => {
            let lock_after = match (lock, no_lock) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let args = MarkArgs {
                class_id: ClassId::from(class_id),
                session_number: session,
                session_date: date,
                present,
                absent,
                lock_after,
            };
            commands::mark(&ctx, args, out).await
        }
        Commands::Lock { class_id, date } => {
            commands::lock(&ctx, &ClassId::from(class_id), date, out).await
        }
        Commands::CheckIn {
            class_id,
            user,
            session,
            date,
        } => {
            commands::check_in(
                &ctx,
                &ClassId::from(class_id),
                UserId::from(user),
                session,
                date,
                out,
            )
            .await
        }
        Commands::Doctor { .. } => Ok(()),
    }
}

/// Install the fmt subscriber; `RUST_LOG` wins over `logging.level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let level = log_level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rollcall={level},rollcall_attendance={level},rollcall_client={level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn mark_parses_comma_separated_ids() {
        let cli = Cli::try_parse_from([
            "rollcall", "mark", "c1", "--session", "2", "--present", "u1,u2", "--absent", "u3",
            "--no-lock",
        ])
        .unwrap();
        match cli.command {
            Commands::Mark {
                present,
                absent,
                no_lock,
                lock,
                ..
            } => {
                assert_eq!(present, vec!["u1", "u2"]);
                assert_eq!(absent, vec!["u3"]);
                assert!(no_lock && !lock);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lock_and_no_lock_conflict() {
        let result = Cli::try_parse_from([
            "rollcall", "mark", "c1", "--session", "1", "--present", "u1", "--lock", "--no-lock",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn roster_requires_date_or_session() {
        assert!(Cli::try_parse_from(["rollcall", "roster", "c1"]).is_err());
        let cli = Cli::try_parse_from(["rollcall", "roster", "c1", "--date", "2024-01-03"]).unwrap();
        assert!(matches!(cli.command, Commands::Roster { date: Some(_), .. }));
    }

    #[test]
    fn bad_dates_are_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["rollcall", "lock", "c1", "--date", "03/01/2024"]).is_err());
    }
}
