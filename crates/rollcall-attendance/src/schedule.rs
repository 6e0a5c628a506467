// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session date derivation from a weekly recurrence.
//!
//! [`resolve`] walks the calendar one day at a time from the start date and
//! keeps every day the schedule meets on, stopping at the configured session
//! count or the end date, whichever comes first. A window too short for the
//! configured count yields a short list; dates are never guessed.

use rollcall_core::{ClassId, ClassOffering, RollcallError, SessionDate, WeeklySchedule};
use serde::Serialize;

/// Resolves the concrete dates of a recurring class, in chronological order.
///
/// Returns at most `total_sessions` dates, all within `start..=end`.
/// An empty schedule or an inverted window gives an empty list.
pub fn resolve(
    schedule: &WeeklySchedule,
    start: SessionDate,
    end: SessionDate,
    total_sessions: u32,
) -> Result<Vec<SessionDate>, RollcallError> {
    if total_sessions == 0 {
        return Err(RollcallError::Validation(
            "totalSessions must be greater than zero".into(),
        ));
    }

    let target = total_sessions as usize;
    let mut dates = Vec::with_capacity(target.min(366));
    if schedule.is_empty() {
        return Ok(dates);
    }

    let mut cursor = Some(start);
    while let Some(day) = cursor {
        if day > end || dates.len() >= target {
            break;
        }
        if schedule.meets_on(day.day_of_week()) {
            dates.push(day);
        }
        cursor = day.succ();
    }

    Ok(dates)
}

/// One numbered session of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSession {
    pub number: u32,
    pub date: SessionDate,
}

/// The resolved, 1-based numbered sessions of a class offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub class_id: ClassId,
    pub configured: u32,
    pub sessions: Vec<PlannedSession>,
}

impl SessionPlan {
    pub fn for_offering(offering: &ClassOffering) -> Result<Self, RollcallError> {
        let dates = resolve(
            &offering.schedule,
            offering.start_date,
            offering.end_date,
            offering.total_sessions,
        )?;
        let sessions = dates
            .into_iter()
            .zip(1u32..)
            .map(|(date, number)| PlannedSession { number, date })
            .collect();
        Ok(Self {
            class_id: offering.id.clone(),
            configured: offering.total_sessions,
            sessions,
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// True when the date window held fewer meetings than configured.
    pub fn is_short(&self) -> bool {
        self.sessions.len() < self.configured as usize
    }

    pub fn date_of(&self, session_number: u32) -> Option<SessionDate> {
        self.sessions
            .iter()
            .find(|s| s.number == session_number)
            .map(|s| s.date)
    }

    pub fn number_on(&self, date: SessionDate) -> Option<u32> {
        self.sessions
            .iter()
            .find(|s| s.date == date)
            .map(|s| s.number)
    }

    /// Date of `session_number`, or `NotFound` when the plan has no such session.
    pub fn require_date(&self, session_number: u32) -> Result<SessionDate, RollcallError> {
        self.date_of(session_number).ok_or_else(|| {
            RollcallError::not_found("session", format!("{}#{session_number}", self.class_id))
        })
    }
}
