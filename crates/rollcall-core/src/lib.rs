// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rollcall class attendance subsystem.
//!
//! This crate provides the calendar date type, the attendance data model,
//! the error taxonomy, and the port traits (`ClassCatalog`,
//! `EnrollmentDirectory`, `AttendanceStore`) that every adapter implements.

pub mod clock;
pub mod date;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use date::{DayOfWeek, SessionDate};
pub use error::RollcallError;
pub use types::{
    AttendanceRecord, ClassId, ClassOffering, Enrollment, EnrollmentId, HealthStatus,
    MarkRequest, RecordId, ScheduleSlot, SessionStatus, SessionView, StudentProfile, UserId,
    WeeklySchedule,
};

pub use traits::{Adapter, AttendanceStore, ClassCatalog, EnrollmentDirectory};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn error_has_all_taxonomy_variants() {
        let _validation = RollcallError::Validation("test".into());
        let _not_found = RollcallError::not_found("class", "c1");
        let _locked = RollcallError::Locked {
            class_id: ClassId::from("c1"),
            session_date: SessionDate::from_ymd(2024, 1, 1).unwrap(),
        };
        let _transport = RollcallError::Transport {
            message: "test".into(),
            source: None,
        };
        let _partial = RollcallError::PartialBatch {
            succeeded: 0,
            failed: vec![],
        };
        let _config = RollcallError::Config("test".into());
        let _internal = RollcallError::Internal("test".into());
    }

    #[test]
    fn weekly_schedule_sorts_and_round_trips_wire_shape() {
        let json = serde_json::json!([
            {"dayOfWeek": 5, "startTime": "18:00", "endTime": "19:00"},
            {"dayOfWeek": 1, "startTime": "07:30", "endTime": "08:30"},
        ]);
        let schedule: WeeklySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.slots()[0].day_of_week, DayOfWeek::MONDAY);
        assert_eq!(schedule.slots()[1].day_of_week, DayOfWeek::FRIDAY);
        assert!(schedule.meets_on(DayOfWeek::FRIDAY));
        assert!(!schedule.meets_on(DayOfWeek::SUNDAY));

        let back = serde_json::to_value(&schedule).unwrap();
        assert_eq!(back[0]["startTime"], "07:30");
    }

    #[test]
    fn schedule_rejects_inverted_slot() {
        let schedule = WeeklySchedule::on_days(&[DayOfWeek::TUESDAY], hm(10, 0), hm(9, 0));
        assert!(matches!(
            schedule.validate(),
            Err(RollcallError::Validation(msg)) if msg.contains("Tue")
        ));
    }

    #[test]
    fn mark_request_requires_ids_and_session_number() {
        let mut req = MarkRequest {
            class_id: ClassId::from("c1"),
            user_id: UserId::from("u1"),
            session_number: 1,
            session_date: SessionDate::from_ymd(2024, 1, 1).unwrap(),
            is_present: true,
            notes: None,
        };
        assert!(req.validate().is_ok());

        req.user_id = UserId::from("  ");
        assert!(req.validate().is_err());

        req.user_id = UserId::from("u1");
        req.session_number = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn session_status_parses_case_insensitively() {
        use std::str::FromStr;

        assert_eq!(
            SessionStatus::from_str("Scheduled").unwrap(),
            SessionStatus::Scheduled
        );
        assert_eq!(SessionStatus::Cancelled.to_string(), "cancelled");
        let view: SessionView = serde_json::from_value(serde_json::json!({
            "sessionNumber": 2,
            "date": "2024-01-03",
            "status": "completed",
            "attendees": ["u1"]
        }))
        .unwrap();
        assert_eq!(view.status, SessionStatus::Completed);
        assert_eq!(view.attendee_ids, vec![UserId::from("u1")]);
    }

    #[test]
    fn enrollment_display_name_falls_back_to_user_id() {
        let mut enrollment = Enrollment {
            id: EnrollmentId::from("e1"),
            class_id: ClassId::from("c1"),
            user_id: UserId::from("u1"),
            payment_status: true,
            student: None,
        };
        assert_eq!(enrollment.display_name(), "u1");
        enrollment.student = Some(StudentProfile {
            full_name: "Ada Lovelace".into(),
            email: None,
        });
        assert_eq!(enrollment.display_name(), "Ada Lovelace");
    }

    #[test]
    fn all_port_traits_are_exported() {
        fn _assert_catalog<T: ClassCatalog>() {}
        fn _assert_directory<T: EnrollmentDirectory>() {}
        fn _assert_store<T: AttendanceStore>() {}
        fn _assert_clock<T: Clock>() {}
        _assert_clock::<SystemClock>();
    }
}
