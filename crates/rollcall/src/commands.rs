// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance subcommands.
//!
//! Each command drives a trainer or student view and writes either a
//! human-readable report or JSON to the given writer.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use rollcall_attendance::{
    BatchOptions, BatchResult, CheckInOutcome, LockOutcome, LockStatus, Ports, ReconciledRow,
    SessionRoster, SessionState, StudentView, TrainerView,
};
use rollcall_core::{ClassId, Clock, RollcallError, SessionDate, UserId};
use serde::Serialize;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text { color: bool },
    Json,
}

/// Everything a command needs besides its own arguments.
#[derive(Clone)]
pub struct Context {
    pub ports: Ports,
    pub options: BatchOptions,
    pub clock: Arc<dyn Clock>,
    pub format: OutputFormat,
}

impl Context {
    fn trainer(&self) -> TrainerView {
        TrainerView::new(self.ports.clone(), self.options.clone())
    }

    fn color(&self) -> bool {
        matches!(self.format, OutputFormat::Text { color: true })
    }
}

/// Arguments of `rollcall mark`.
#[derive(Debug, Clone)]
pub struct MarkArgs {
    pub class_id: ClassId,
    pub session_number: u32,
    pub session_date: Option<SessionDate>,
    pub present: Vec<String>,
    pub absent: Vec<String>,
    pub lock_after: Option<bool>,
}

fn io_err(e: std::io::Error) -> RollcallError {
    RollcallError::Internal(format!("failed to write output: {e}"))
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<(), RollcallError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| RollcallError::Internal(format!("failed to encode output: {e}")))?;
    writeln!(out).map_err(io_err)
}

/// `rollcall sessions <class>`: the resolved session dates.
pub async fn sessions(
    ctx: &Context,
    class_id: &ClassId,
    out: &mut dyn Write,
) -> Result<(), RollcallError> {
    let plan = ctx.trainer().plan(class_id).await?;
    if ctx.format == OutputFormat::Json {
        return write_json(out, &plan);
    }

    writeln!(out, "Class {class_id}: {} sessions", plan.len()).map_err(io_err)?;
    for session in &plan.sessions {
        writeln!(
            out,
            "  {:>3}  {}  {}",
            session.number,
            session.date,
            session.date.day_of_week()
        )
        .map_err(io_err)?;
    }
    if plan.is_short() {
        let warning = format!(
            "warning: only {} of {} configured sessions fit between the class start and end dates",
            plan.len(),
            plan.configured
        );
        let warning = if ctx.color() {
            warning.yellow().to_string()
        } else {
            warning
        };
        writeln!(out, "{warning}").map_err(io_err)?;
    }
    Ok(())
}

/// `rollcall roster <class> --date D | --session N`: reconciled roster.
pub async fn roster(
    ctx: &Context,
    class_id: &ClassId,
    session_date: Option<SessionDate>,
    session_number: Option<u32>,
    out: &mut dyn Write,
) -> Result<(), RollcallError> {
    let trainer = ctx.trainer();
    let session_date = match (session_date, session_number) {
        (Some(date), _) => date,
        (None, Some(number)) => trainer.plan(class_id).await?.require_date(number)?,
        (None, None) => {
            return Err(RollcallError::Validation(
                "pass --date or --session".to_string(),
            ));
        }
    };

    let roster = trainer.session_roster(class_id, session_date).await?;
    if ctx.format == OutputFormat::Json {
        return write_json(out, &roster);
    }
    print_roster(&roster, ctx.color(), out)
}

fn print_roster(
    roster: &SessionRoster,
    color: bool,
    out: &mut dyn Write,
) -> Result<(), RollcallError> {
    let session = roster
        .session_number
        .map(|n| format!("session {n}"))
        .unwrap_or_else(|| "unscheduled date".to_string());
    let state = match roster.state {
        SessionState::Open => "open",
        SessionState::Locked => "locked",
    };
    writeln!(
        out,
        "Class {}, {session} ({}) [{state}]",
        roster.class_id, roster.session_date
    )
    .map_err(io_err)?;

    for entry in &roster.entries {
        let label = match &entry.row {
            ReconciledRow::Placeholder { .. } => "-",
            ReconciledRow::Existing(r) if r.is_present => "present",
            ReconciledRow::Existing(_) => "absent",
        };
        let label = match (color, label) {
            (true, "present") => format!("{:<8}", label).green().to_string(),
            (true, "absent") => format!("{:<8}", label).red().to_string(),
            _ => format!("{label:<8}"),
        };
        let lock = if entry.row.is_locked() { " (locked)" } else { "" };
        writeln!(
            out,
            "  {label} {} ({}){lock}",
            entry.enrollment.display_name(),
            entry.enrollment.user_id
        )
        .map_err(io_err)?;
    }

    let t = &roster.tally;
    writeln!(
        out,
        "present {}, absent {}, unmarked {}",
        t.present, t.absent, t.unmarked
    )
    .map_err(io_err)
}

/// Builds the desired-status map, rejecting users listed as both.
fn desired_statuses(
    present: &[String],
    absent: &[String],
) -> Result<BTreeMap<UserId, bool>, RollcallError> {
    let mut desired = BTreeMap::new();
    for user in present.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        desired.insert(UserId::from(user), true);
    }
    for user in absent.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        if desired.insert(UserId::from(user), false).is_some() {
            return Err(RollcallError::Validation(format!(
                "{user} is listed as both present and absent"
            )));
        }
    }
    if desired.is_empty() {
        return Err(RollcallError::Validation(
            "nothing to mark, pass --present and/or --absent".to_string(),
        ));
    }
    Ok(desired)
}

/// `rollcall mark`: batch-mark one session.
///
/// The report is printed before a partial failure is returned, so the
/// caller sees which students need another attempt.
pub async fn mark(ctx: &Context, args: MarkArgs, out: &mut dyn Write) -> Result<(), RollcallError> {
    let desired = desired_statuses(&args.present, &args.absent)?;
    let result = ctx
        .trainer()
        .mark_session(
            &args.class_id,
            args.session_number,
            args.session_date,
            desired,
            args.lock_after,
        )
        .await?;

    if ctx.format == OutputFormat::Json {
        write_json(out, &result)?;
    } else {
        print_batch(&result, out)?;
    }

    match result.partial_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn print_batch(result: &BatchResult, out: &mut dyn Write) -> Result<(), RollcallError> {
    writeln!(out, "{}", result.summary()).map_err(io_err)?;
    for failure in &result.failed {
        writeln!(out, "  failed   {}: {}", failure.user_id, failure.reason).map_err(io_err)?;
    }
    for user in &result.skipped_locked {
        writeln!(out, "  skipped  {user}: already finalized").map_err(io_err)?;
    }
    if !result.unchanged.is_empty() {
        writeln!(out, "  unchanged {}", result.unchanged.len()).map_err(io_err)?;
    }
    let lock = match &result.lock {
        LockStatus::NotRequested => "lock: not requested".to_string(),
        LockStatus::Skipped => "lock: skipped, nothing was saved".to_string(),
        LockStatus::Locked { records } => format!("lock: locked {records} record(s)"),
        LockStatus::AlreadyLocked => "lock: already locked".to_string(),
        LockStatus::NothingToLock => "lock: nothing to lock".to_string(),
        LockStatus::Failed { reason } => format!("lock: failed, {reason}"),
    };
    writeln!(out, "{lock}").map_err(io_err)
}

/// `rollcall lock <class> --date D`.
pub async fn lock(
    ctx: &Context,
    class_id: &ClassId,
    session_date: SessionDate,
    out: &mut dyn Write,
) -> Result<(), RollcallError> {
    let outcome = ctx.trainer().lock(class_id, session_date).await?;
    if ctx.format == OutputFormat::Json {
        return write_json(out, &outcome);
    }
    let line = match outcome {
        LockOutcome::Locked { records } => {
            format!("locked {records} record(s) for {class_id} on {session_date}")
        }
        LockOutcome::AlreadyLocked => format!("{class_id} on {session_date} was already locked"),
        LockOutcome::NothingToLock => {
            format!("no attendance recorded for {class_id} on {session_date}, nothing to lock")
        }
    };
    writeln!(out, "{line}").map_err(io_err)
}

/// `rollcall check-in <class> --user U --session N`.
pub async fn check_in(
    ctx: &Context,
    class_id: &ClassId,
    user_id: UserId,
    session_number: u32,
    session_date: Option<SessionDate>,
    out: &mut dyn Write,
) -> Result<(), RollcallError> {
    let student = StudentView::new(user_id, ctx.ports.clone(), ctx.clock.clone());
    let outcome = student
        .check_in(class_id, session_number, session_date)
        .await?;
    if ctx.format == OutputFormat::Json {
        return write_json(out, &outcome);
    }
    let line = match &outcome {
        CheckInOutcome::CheckedIn(r) => {
            format!("checked in for session {} ({})", r.session_number, r.session_date)
        }
        CheckInOutcome::AlreadyCheckedIn(r) => format!(
            "already checked in for session {} ({})",
            r.session_number, r.session_date
        ),
    };
    writeln!(out, "{line}").map_err(io_err)
}
