// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class session attendance for Rollcall.
//!
//! Leaf-first:
//! - [`schedule`] resolves concrete session dates from a weekly recurrence.
//! - [`reconcile`] pairs the enrollment roster with stored attendance rows.
//! - [`lock`] guards every write with the Open/Locked session lifecycle.
//! - [`batch`] and [`checkin`] are the trainer and student write workflows.
//! - [`views`] exposes them as trainer and student capabilities.

pub mod batch;
pub mod checkin;
pub mod lock;
pub mod reconcile;
pub mod schedule;
pub mod sessions;
pub mod summary;
pub mod views;

pub use batch::{
    target_session, BatchFailure, BatchMarkWorkflow, BatchOptions, BatchRequest, BatchResult,
    LockStatus,
};
pub use checkin::{CheckInOutcome, CheckInWorkflow};
pub use lock::{LockOutcome, SessionLockController, SessionState};
pub use reconcile::{reconcile, tally, ReconciledRow, RosterTally};
pub use schedule::{resolve, PlannedSession, SessionPlan};
pub use sessions::derive_session_views;
pub use summary::{summarize, AttendanceSummary};
pub use views::{Ports, RosterEntry, SessionRoster, StudentView, TrainerView};
