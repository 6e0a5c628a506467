// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Student self check-in.
//!
//! A student may only mark themselves present for the session scheduled
//! today. Repeat check-ins return the existing record without writing.

use std::sync::Arc;

use rollcall_core::{
    AttendanceRecord, AttendanceStore, ClassCatalog, ClassId, Clock, MarkRequest, RollcallError,
    SessionDate, SessionStatus, UserId,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::lock::SessionLockController;

/// Result of a successful self check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "camelCase")]
pub enum CheckInOutcome {
    CheckedIn(AttendanceRecord),
    AlreadyCheckedIn(AttendanceRecord),
}

impl CheckInOutcome {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            Self::CheckedIn(record) | Self::AlreadyCheckedIn(record) => record,
        }
    }
}

#[derive(Clone)]
pub struct CheckInWorkflow {
    catalog: Arc<dyn ClassCatalog>,
    store: Arc<dyn AttendanceStore>,
    locks: SessionLockController,
    clock: Arc<dyn Clock>,
}

impl CheckInWorkflow {
    pub fn new(
        catalog: Arc<dyn ClassCatalog>,
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locks = SessionLockController::new(store.clone());
        Self {
            catalog,
            store,
            locks,
            clock,
        }
    }

    /// Marks `user_id` present for `session_number` if that session is
    /// scheduled for `candidate_date` and `candidate_date` is today.
    pub async fn self_check_in(
        &self,
        class_id: &ClassId,
        user_id: &UserId,
        session_number: u32,
        candidate_date: SessionDate,
    ) -> Result<CheckInOutcome, RollcallError> {
        if class_id.is_blank() {
            return Err(RollcallError::Validation("classId is required".into()));
        }
        if user_id.is_blank() {
            return Err(RollcallError::Validation("userId is required".into()));
        }

        let today = self.clock.today();
        if candidate_date != today {
            return Err(RollcallError::Validation(format!(
                "check-in is only open on the day of the session (today is {today}, not {candidate_date})"
            )));
        }

        let sessions = self.catalog.sessions(class_id).await?;
        let session = sessions
            .iter()
            .find(|s| s.session_number == session_number)
            .ok_or_else(|| {
                RollcallError::not_found("session", format!("{class_id}#{session_number}"))
            })?;
        if session.status != SessionStatus::Scheduled {
            return Err(RollcallError::Validation(format!(
                "session {session_number} is {}, check-in is closed",
                session.status
            )));
        }
        if session.date != candidate_date {
            return Err(RollcallError::Validation(format!(
                "session {session_number} takes place on {}, not today",
                session.date
            )));
        }

        let records = self.store.records_for_class(class_id).await?;
        if let Some(existing) = records
            .iter()
            .find(|r| r.user_id == *user_id && r.is_present && r.session_date == candidate_date)
        {
            debug!(%class_id, %user_id, session_number, "already checked in");
            return Ok(CheckInOutcome::AlreadyCheckedIn(existing.clone()));
        }

        let record = self
            .locks
            .mark(&MarkRequest {
                class_id: class_id.clone(),
                user_id: user_id.clone(),
                session_number,
                session_date: candidate_date,
                is_present: true,
                notes: None,
            })
            .await?;
        info!(%class_id, %user_id, session_number, "self check-in recorded");
        Ok(CheckInOutcome::CheckedIn(record))
    }
}
