// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable attendance record port.

use async_trait::async_trait;

use crate::date::SessionDate;
use crate::error::RollcallError;
use crate::traits::adapter::Adapter;
use crate::types::{AttendanceRecord, ClassId, MarkRequest};

/// CRUD access to attendance rows.
///
/// Implementations must upsert on `(class_id, user_id, session_number)`
/// and never hold two rows for the same triple. Lock enforcement lives in
/// the session lock controller, not here.
#[async_trait]
pub trait AttendanceStore: Adapter {
    /// Every attendance row of a class, across all session dates.
    async fn records_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<AttendanceRecord>, RollcallError>;

    /// Rows of a class on one calendar date.
    async fn records_for_session(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<Vec<AttendanceRecord>, RollcallError> {
        let mut records = self.records_for_class(class_id).await?;
        records.retain(|r| r.session_date == session_date);
        Ok(records)
    }

    /// Creates the row for the request's triple, or updates it in place.
    async fn mark(&self, request: &MarkRequest) -> Result<AttendanceRecord, RollcallError>;

    /// Changes `is_present` on an existing row, identified by `record.id`.
    ///
    /// The whole record is passed so a server-side lock rejection can be
    /// reported against its class and date.
    async fn update_presence(
        &self,
        record: &AttendanceRecord,
        is_present: bool,
    ) -> Result<AttendanceRecord, RollcallError>;

    /// Sets `is_locked` on every existing row of the class+date.
    async fn lock_session(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<(), RollcallError>;
}
