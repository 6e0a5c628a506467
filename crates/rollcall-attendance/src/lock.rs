// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Open/Locked lifecycle of a session date.
//!
//! A class+date is Locked once at least one record exists and every record
//! on that date is locked. Locked is terminal here: there is no unlock.
//! All attendance writes go through [`SessionLockController`] so a locked
//! date rejects mutation regardless of which workflow issued it.

use std::sync::Arc;

use rollcall_core::{
    AttendanceRecord, AttendanceStore, ClassId, MarkRequest, RollcallError, SessionDate,
};
use serde::Serialize;
use tracing::{debug, info};

/// Whether a class+date still accepts attendance writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Open,
    Locked,
}

impl SessionState {
    /// Derives the state from the records of one class+date.
    pub fn of(records_on_date: &[AttendanceRecord]) -> Self {
        if !records_on_date.is_empty() && records_on_date.iter().all(|r| r.is_locked) {
            Self::Locked
        } else {
            Self::Open
        }
    }
}

/// Result of a lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LockOutcome {
    /// Records on the date were locked; `records` counts those that changed.
    Locked { records: usize },
    /// Every record on the date was already locked. Not an error.
    AlreadyLocked,
    /// No records exist for the date, so it stays Open.
    NothingToLock,
}

/// Gatekeeper for every write to the attendance store.
#[derive(Clone)]
pub struct SessionLockController {
    store: Arc<dyn AttendanceStore>,
}

impl SessionLockController {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    pub async fn state(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<SessionState, RollcallError> {
        let records = self.store.records_for_session(class_id, session_date).await?;
        Ok(SessionState::of(&records))
    }

    pub async fn is_locked(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<bool, RollcallError> {
        Ok(self.state(class_id, session_date).await? == SessionState::Locked)
    }

    /// Fails with [`RollcallError::Locked`] if the class+date is locked.
    pub async fn assert_mutable(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<(), RollcallError> {
        if self.is_locked(class_id, session_date).await? {
            return Err(locked(class_id, session_date));
        }
        Ok(())
    }

    /// Locks every existing record of the class+date. Re-locking is harmless.
    pub async fn lock(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<LockOutcome, RollcallError> {
        if class_id.is_blank() {
            return Err(RollcallError::Validation("classId is required".into()));
        }

        let records = self.store.records_for_session(class_id, session_date).await?;
        if records.is_empty() {
            debug!(%class_id, %session_date, "no attendance records, nothing to lock");
            return Ok(LockOutcome::NothingToLock);
        }
        let unlocked = records.iter().filter(|r| !r.is_locked).count();
        if unlocked == 0 {
            debug!(%class_id, %session_date, "session already locked");
            return Ok(LockOutcome::AlreadyLocked);
        }

        self.store.lock_session(class_id, session_date).await?;
        info!(%class_id, %session_date, records = unlocked, "session locked");
        Ok(LockOutcome::Locked { records: unlocked })
    }

    /// Upserts one record after checking the date and the target row are mutable.
    pub async fn mark(&self, request: &MarkRequest) -> Result<AttendanceRecord, RollcallError> {
        request.validate()?;

        let records = self.store.records_for_class(&request.class_id).await?;
        let on_date: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| r.session_date == request.session_date)
            .cloned()
            .collect();
        if SessionState::of(&on_date) == SessionState::Locked {
            return Err(locked(&request.class_id, request.session_date));
        }
        // The row for this triple may sit on another date if session numbers were re-derived.
        if let Some(existing) = records
            .iter()
            .find(|r| r.has_key(&request.class_id, &request.user_id, request.session_number))
        {
            if existing.is_locked {
                return Err(locked(&request.class_id, existing.session_date));
            }
        }

        let record = self.store.mark(request).await?;
        debug!(
            class_id = %request.class_id,
            user_id = %request.user_id,
            session_number = request.session_number,
            is_present = request.is_present,
            "attendance marked"
        );
        Ok(record)
    }

    /// Changes `is_present` on an existing record after checking it is mutable.
    pub async fn update_presence(
        &self,
        record: &AttendanceRecord,
        is_present: bool,
    ) -> Result<AttendanceRecord, RollcallError> {
        if record.is_locked {
            return Err(locked(&record.class_id, record.session_date));
        }
        self.assert_mutable(&record.class_id, record.session_date)
            .await?;

        let updated = self.store.update_presence(record, is_present).await?;
        debug!(
            record_id = %record.id,
            user_id = %record.user_id,
            is_present,
            "attendance updated"
        );
        Ok(updated)
    }
}

fn locked(class_id: &ClassId, session_date: SessionDate) -> RollcallError {
    RollcallError::Locked {
        class_id: class_id.clone(),
        session_date,
    }
}
