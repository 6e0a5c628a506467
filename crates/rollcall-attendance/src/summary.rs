// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-student attendance summary over the sessions held so far.

use rollcall_core::{AttendanceRecord, SessionDate, UserId};
use serde::Serialize;

use crate::schedule::SessionPlan;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    /// Sessions dated on or before today.
    pub held: usize,
    pub attended: usize,
    /// Held sessions with a record marking the student absent.
    pub absent: usize,
    /// Held sessions with no record for the student.
    pub unmarked: usize,
    /// `attended / held`, or 0 when nothing has been held yet.
    pub rate: f64,
}

pub fn summarize(
    plan: &SessionPlan,
    records: &[AttendanceRecord],
    user_id: &UserId,
    today: SessionDate,
) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        held: 0,
        attended: 0,
        absent: 0,
        unmarked: 0,
        rate: 0.0,
    };

    for session in plan.sessions.iter().filter(|s| s.date <= today) {
        summary.held += 1;
        let record = records
            .iter()
            .find(|r| &r.user_id == user_id && r.session_date == session.date);
        match record {
            Some(r) if r.is_present => summary.attended += 1,
            Some(_) => summary.absent += 1,
            None => summary.unmarked += 1,
        }
    }

    if summary.held > 0 {
        summary.rate = summary.attended as f64 / summary.held as f64;
    }
    summary
}
