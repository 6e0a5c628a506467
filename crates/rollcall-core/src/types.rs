// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the ports, workflows, and REST client.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::date::{DayOfWeek, SessionDate};
use crate::error::RollcallError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a class offering.
    ClassId
);
string_id!(
    /// Identifier of a user (student or instructor).
    UserId
);
string_id!(
    /// Identifier of a persisted attendance record.
    RecordId
);
string_id!(
    /// Identifier of an enrollment.
    EnrollmentId
);

/// `HH:MM` (or `HH:MM:SS`) wall-clock times in schedule slots.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time `{raw}`: expected HH:MM")))
    }
}

/// One weekly occurrence of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

/// The weekly recurrence of a class, kept sorted by day then start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScheduleSlot>", into = "Vec<ScheduleSlot>")]
pub struct WeeklySchedule {
    slots: Vec<ScheduleSlot>,
}

impl WeeklySchedule {
    pub fn new(mut slots: Vec<ScheduleSlot>) -> Self {
        slots.sort_by_key(|s| (s.day_of_week, s.start_time));
        Self { slots }
    }

    /// Builds a schedule with one `start..end` slot on each given day.
    pub fn on_days(days: &[DayOfWeek], start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(
            days.iter()
                .map(|&day_of_week| ScheduleSlot {
                    day_of_week,
                    start_time: start,
                    end_time: end,
                })
                .collect(),
        )
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn meets_on(&self, day: DayOfWeek) -> bool {
        self.slots.iter().any(|s| s.day_of_week == day)
    }

    /// Rejects slots that end before they start.
    pub fn validate(&self) -> Result<(), RollcallError> {
        for slot in &self.slots {
            if slot.end_time <= slot.start_time {
                return Err(RollcallError::Validation(format!(
                    "schedule slot on {} ends ({}) before it starts ({})",
                    slot.day_of_week,
                    slot.end_time.format("%H:%M"),
                    slot.start_time.format("%H:%M"),
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<ScheduleSlot>> for WeeklySchedule {
    fn from(slots: Vec<ScheduleSlot>) -> Self {
        Self::new(slots)
    }
}

impl From<WeeklySchedule> for Vec<ScheduleSlot> {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule.slots
    }
}

/// Authoritative parameters for session-date derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOffering {
    pub id: ClassId,
    pub start_date: SessionDate,
    pub end_date: SessionDate,
    pub total_sessions: u32,
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub instructor_id: Option<UserId>,
}

/// Display details for an enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A student's membership of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub class_id: ClassId,
    pub user_id: UserId,
    #[serde(default)]
    pub payment_status: bool,
    #[serde(default)]
    pub student: Option<StudentProfile>,
}

impl Enrollment {
    /// Name to show for this student, falling back to the user id.
    pub fn display_name(&self) -> &str {
        self.student
            .as_ref()
            .map(|s| s.full_name.as_str())
            .unwrap_or(self.user_id.as_str())
    }
}

/// A persisted attendance row. Unique per `(class_id, user_id, session_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub class_id: ClassId,
    pub user_id: UserId,
    pub session_number: u32,
    pub session_date: SessionDate,
    pub is_present: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub marked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// True when this record belongs to `(class_id, user_id, session_number)`.
    pub fn has_key(&self, class_id: &ClassId, user_id: &UserId, session_number: u32) -> bool {
        &self.class_id == class_id && &self.user_id == user_id && self.session_number == session_number
    }
}

/// Create-or-update request for one attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    pub class_id: ClassId,
    pub user_id: UserId,
    pub session_number: u32,
    pub session_date: SessionDate,
    pub is_present: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MarkRequest {
    pub fn validate(&self) -> Result<(), RollcallError> {
        if self.class_id.is_blank() {
            return Err(RollcallError::Validation("classId is required".into()));
        }
        if self.user_id.is_blank() {
            return Err(RollcallError::Validation("userId is required".into()));
        }
        if self.session_number == 0 {
            return Err(RollcallError::Validation(
                "sessionNumber must be 1 or greater".into(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle status of a derived session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// One concrete occurrence of a class. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_number: u32,
    pub date: SessionDate,
    pub status: SessionStatus,
    #[serde(default, rename = "attendees")]
    pub attendee_ids: Vec<UserId>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
