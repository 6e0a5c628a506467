// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster-to-attendance reconciliation.
//!
//! Produces exactly one row per enrolled student for a session date, so a
//! trainer always sees who has not been marked yet. Rows are matched on
//! `(user_id, session_date)`; the record's session number is informational.

use std::collections::HashMap;

use rollcall_core::{AttendanceRecord, Enrollment, SessionDate, UserId};
use serde::Serialize;

/// A student's attendance on one date: the stored record, or a synthesized
/// not-yet-marked row that has never been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReconciledRow {
    Existing(AttendanceRecord),
    #[serde(rename_all = "camelCase")]
    Placeholder {
        student_id: UserId,
        session_date: SessionDate,
    },
}

impl ReconciledRow {
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Existing(record) => &record.user_id,
            Self::Placeholder { student_id, .. } => student_id,
        }
    }

    pub fn session_date(&self) -> SessionDate {
        match self {
            Self::Existing(record) => record.session_date,
            Self::Placeholder { session_date, .. } => *session_date,
        }
    }

    /// Placeholders are always absent.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Existing(record) if record.is_present)
    }

    /// Placeholders are always unlocked.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Existing(record) if record.is_locked)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        match self {
            Self::Existing(record) => Some(record),
            Self::Placeholder { .. } => None,
        }
    }
}

/// Pairs each enrollment, in roster order, with its record on `session_date`.
///
/// The output always has `roster.len()` rows. If several records match one
/// student, the first one in `records` wins.
pub fn reconcile(
    roster: &[Enrollment],
    records: &[AttendanceRecord],
    session_date: SessionDate,
) -> Vec<ReconciledRow> {
    let mut by_user: HashMap<&UserId, &AttendanceRecord> = HashMap::new();
    for record in records.iter().filter(|r| r.session_date == session_date) {
        by_user.entry(&record.user_id).or_insert(record);
    }

    roster
        .iter()
        .map(|enrollment| match by_user.get(&enrollment.user_id) {
            Some(record) => ReconciledRow::Existing((*record).clone()),
            None => ReconciledRow::Placeholder {
                student_id: enrollment.user_id.clone(),
                session_date,
            },
        })
        .collect()
}

/// Head counts over a reconciled roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterTally {
    pub present: usize,
    pub absent: usize,
    pub unmarked: usize,
    pub locked: usize,
}

pub fn tally(rows: &[ReconciledRow]) -> RosterTally {
    rows.iter().fold(RosterTally::default(), |mut t, row| {
        match row {
            ReconciledRow::Placeholder { .. } => t.unmarked += 1,
            ReconciledRow::Existing(r) if r.is_present => t.present += 1,
            ReconciledRow::Existing(_) => t.absent += 1,
        }
        if row.is_locked() {
            t.locked += 1;
        }
        t
    })
}
