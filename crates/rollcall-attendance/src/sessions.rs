// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local derivation of session views from a class offering.

use std::collections::BTreeSet;

use rollcall_core::{
    AttendanceRecord, ClassOffering, RollcallError, SessionDate, SessionStatus, SessionView,
};

use crate::schedule::SessionPlan;

/// Builds the session list of a class as of `today`.
///
/// Past dates are `Completed`, today and later `Scheduled`, and anything in
/// `cancelled` is `Cancelled`. Attendees are users with a present record on
/// the session date.
pub fn derive_session_views(
    offering: &ClassOffering,
    today: SessionDate,
    cancelled: &BTreeSet<SessionDate>,
    records: &[AttendanceRecord],
) -> Result<Vec<SessionView>, RollcallError> {
    let plan = SessionPlan::for_offering(offering)?;
    let views = plan
        .sessions
        .iter()
        .map(|session| {
            let status = if cancelled.contains(&session.date) {
                SessionStatus::Cancelled
            } else if session.date < today {
                SessionStatus::Completed
            } else {
                SessionStatus::Scheduled
            };
            let attendee_ids = records
                .iter()
                .filter(|r| {
                    r.class_id == offering.id && r.session_date == session.date && r.is_present
                })
                .map(|r| r.user_id.clone())
                .collect();
            SessionView {
                session_number: session.number,
                date: session.date,
                status,
                attendee_ids,
            }
        })
        .collect();
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rollcall_core::{ClassId, DayOfWeek, RecordId, UserId, WeeklySchedule};

    fn d(s: &str) -> SessionDate {
        s.parse().unwrap()
    }

    fn offering() -> ClassOffering {
        ClassOffering {
            id: ClassId::from("spin"),
            start_date: d("2024-01-01"),
            end_date: d("2024-01-31"),
            total_sessions: 4,
            schedule: WeeklySchedule::on_days(
                &[DayOfWeek::TUESDAY, DayOfWeek::THURSDAY],
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            ),
            instructor_id: None,
        }
    }

    #[test]
    fn statuses_follow_today_and_cancellations() {
        let cancelled = BTreeSet::from([d("2024-01-11")]);
        let records = vec![AttendanceRecord {
            id: RecordId::from("r1"),
            class_id: ClassId::from("spin"),
            user_id: UserId::from("u1"),
            session_number: 1,
            session_date: d("2024-01-02"),
            is_present: true,
            is_locked: true,
            marked_at: None,
            notes: None,
        }];

        let views = derive_session_views(&offering(), d("2024-01-09"), &cancelled, &records).unwrap();

        let statuses: Vec<_> = views.iter().map(|v| (v.session_number, v.date, v.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, d("2024-01-02"), SessionStatus::Completed),
                (2, d("2024-01-04"), SessionStatus::Completed),
                (3, d("2024-01-09"), SessionStatus::Scheduled),
                (4, d("2024-01-11"), SessionStatus::Cancelled),
            ]
        );
        assert_eq!(views[0].attendee_ids, vec![UserId::from("u1")]);
        assert!(views[1].attendee_ids.is_empty());
    }
}
