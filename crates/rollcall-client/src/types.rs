// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the gym REST API.
//!
//! The API speaks camelCase JSON with Mongo-style `_id` fields and sometimes
//! populates references (`userId: {_id, fullName}`) instead of sending bare
//! ids. These DTOs absorb that variance and convert into domain types.

use chrono::{DateTime, Utc};
use rollcall_core::{
    AttendanceRecord, ClassId, ClassOffering, Enrollment, EnrollmentId, RecordId, RollcallError,
    SessionDate, SessionStatus, SessionView, StudentProfile, UserId, WeeklySchedule,
};
use serde::{Deserialize, Serialize};

/// A reference that arrives either as a bare id or as a populated document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    /// `"64f..."`
    Bare(String),
    /// `{"_id": "64f...", ...}`
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl IdRef {
    pub fn into_id(self) -> String {
        match self {
            Self::Bare(id) | Self::Populated { id } => id,
        }
    }
}

/// Response payloads are either bare or wrapped in `{data: ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(alias = "attendance", alias = "enrollments", alias = "sessions")]
        data: T,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Body of `GET /classes/{classId}/details`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetailsDto {
    #[serde(default)]
    pub schedule: WeeklySchedule,
    pub start_date: SessionDate,
    pub end_date: SessionDate,
    pub total_sessions: u32,
    #[serde(default)]
    pub instructor: Option<IdRef>,
}

impl ClassDetailsDto {
    /// The details endpoint omits the class id; the caller supplies it.
    ///
    /// Fails when a schedule slot ends before it starts.
    pub fn into_offering(self, class_id: &ClassId) -> Result<ClassOffering, RollcallError> {
        self.schedule.validate()?;
        Ok(ClassOffering {
            id: class_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            total_sessions: self.total_sessions,
            schedule: self.schedule,
            instructor_id: self.instructor.map(|i| UserId(i.into_id())),
        })
    }
}

/// Populated user document inside a roster entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUserDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One element of `GET /classes/{classId}/enrollments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub user: RosterUserDto,
    #[serde(default)]
    pub payment_status: bool,
}

impl EnrollmentDto {
    pub fn into_enrollment(self, class_id: &ClassId) -> Enrollment {
        let user_id = UserId(self.user.id);
        let id = self
            .id
            .unwrap_or_else(|| format!("{class_id}:{user_id}"));
        let student = self.user.full_name.map(|full_name| StudentProfile {
            full_name,
            email: self.user.email,
        });
        Enrollment {
            id: EnrollmentId(id),
            class_id: class_id.clone(),
            user_id,
            payment_status: self.payment_status,
            student,
        }
    }
}

/// Attendance row as stored by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub class_id: IdRef,
    pub user_id: IdRef,
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

impl From<AttendanceRecordDto> for AttendanceRecord {
    fn from(dto: AttendanceRecordDto) -> Self {
        Self {
            id: RecordId(dto.id),
            class_id: ClassId(dto.class_id.into_id()),
            user_id: UserId(dto.user_id.into_id()),
            session_number: dto.session_number,
            session_date: dto.session_date,
            is_present: dto.is_present,
            is_locked: dto.is_locked,
            marked_at: dto.marked_at,
            notes: dto.notes,
        }
    }
}

/// One element of `GET /attendances/class/{classId}/sessions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub session_number: u32,
    pub date: SessionDate,
    pub status: SessionStatus,
    #[serde(default)]
    pub attendees: Vec<IdRef>,
}

impl From<SessionDto> for SessionView {
    fn from(dto: SessionDto) -> Self {
        Self {
            session_number: dto.session_number,
            date: dto.date,
            status: dto.status,
            attendee_ids: dto
                .attendees
                .into_iter()
                .map(|a| UserId(a.into_id()))
                .collect(),
        }
    }
}

/// Body of `PUT /attendance/{recordId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePresenceBody {
    pub is_present: bool,
}

/// Body of `POST /attendance/lock-session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockSessionBody<'a> {
    pub class_id: &'a ClassId,
    pub session_date: SessionDate,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}
