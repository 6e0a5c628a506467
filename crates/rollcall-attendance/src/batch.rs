// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trainer batch marking.
//!
//! A batch reconciles the roster for one date, writes one record per student
//! whose desired status differs from what is stored, and optionally locks
//! the date afterwards. Writes run one at a time; a failed write is recorded
//! against its student and the batch moves on. Nothing is rolled back.
//!
//! Locking is date-scoped: students never marked in the batch are frozen in
//! whatever state they had (placeholders stay unmarked, i.e. absent). The
//! lock is attempted after any successful write even if other writes failed.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rollcall_config::model::AttendanceConfig;
use rollcall_core::{
    AttendanceStore, ClassId, ClassOffering, Enrollment, MarkRequest, RollcallError,
    SessionDate, UserId,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::lock::{LockOutcome, SessionLockController};
use crate::reconcile::{reconcile, ReconciledRow};
use crate::schedule::SessionPlan;

/// Workflow defaults, usually taken from `[attendance]` config.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Lock the date after a batch with at least one successful write.
    pub lock_after: bool,
    /// Notes attached to records created by a batch.
    pub default_notes: Option<String>,
}

impl From<&AttendanceConfig> for BatchOptions {
    fn from(config: &AttendanceConfig) -> Self {
        Self {
            lock_after: config.lock_after_batch,
            default_notes: config.default_notes.clone(),
        }
    }
}

/// One trainer submission for a single session date.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub class_id: ClassId,
    pub session_date: SessionDate,
    pub session_number: u32,
    pub roster: Vec<Enrollment>,
    /// Desired presence per student. Students absent from the map are left alone.
    pub desired: BTreeMap<UserId, bool>,
    /// Overrides [`BatchOptions::lock_after`] for this batch.
    pub lock_after: Option<bool>,
}

/// A student whose write did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub user_id: UserId,
    pub reason: String,
}

/// What happened to the lock step of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LockStatus {
    NotRequested,
    /// Requested, but no write succeeded.
    Skipped,
    Locked { records: usize },
    AlreadyLocked,
    NothingToLock,
    Failed { reason: String },
}

impl From<LockOutcome> for LockStatus {
    fn from(outcome: LockOutcome) -> Self {
        match outcome {
            LockOutcome::Locked { records } => Self::Locked { records },
            LockOutcome::AlreadyLocked => Self::AlreadyLocked,
            LockOutcome::NothingToLock => Self::NothingToLock,
        }
    }
}

/// Per-student outcome of a batch plus the lock step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub succeeded: Vec<UserId>,
    pub failed: Vec<BatchFailure>,
    /// Rows that were already locked and so excluded from the batch.
    pub skipped_locked: Vec<UserId>,
    /// Rows whose stored status already matched the desired one.
    pub unchanged: Vec<UserId>,
    pub lock: LockStatus,
}

impl BatchResult {
    fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped_locked: Vec::new(),
            unchanged: Vec::new(),
            lock: LockStatus::NotRequested,
        }
    }

    /// True when some writes succeeded and some failed.
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// The aggregate failure for this batch, if any student failed.
    pub fn partial_failure(&self) -> Option<RollcallError> {
        if self.failed.is_empty() {
            return None;
        }
        Some(RollcallError::PartialBatch {
            succeeded: self.succeeded.len(),
            failed: self
                .failed
                .iter()
                .map(|f| (f.user_id.clone(), f.reason.clone()))
                .collect(),
        })
    }

    /// One-line summary, e.g. `saved 4, failed 1`.
    pub fn summary(&self) -> String {
        format!("saved {}, failed {}", self.succeeded.len(), self.failed.len())
    }
}

/// Resolves the calendar date of `session_number` for a class.
pub fn target_session(
    offering: &ClassOffering,
    session_number: u32,
) -> Result<SessionDate, RollcallError> {
    SessionPlan::for_offering(offering)?.require_date(session_number)
}

/// Reconcile, write changed rows one by one, then optionally lock.
#[derive(Clone)]
pub struct BatchMarkWorkflow {
    store: Arc<dyn AttendanceStore>,
    locks: SessionLockController,
    options: BatchOptions,
}

impl BatchMarkWorkflow {
    pub fn new(store: Arc<dyn AttendanceStore>, options: BatchOptions) -> Self {
        let locks = SessionLockController::new(store.clone());
        Self {
            store,
            locks,
            options,
        }
    }

    pub fn lock_controller(&self) -> &SessionLockController {
        &self.locks
    }

    /// Applies a batch. Only request validation and the initial record fetch
    /// fail the call; per-student failures are reported in the result.
    pub async fn apply(&self, request: BatchRequest) -> Result<BatchResult, RollcallError> {
        if request.class_id.is_blank() {
            return Err(RollcallError::Validation("classId is required".into()));
        }
        if request.session_number == 0 {
            return Err(RollcallError::Validation(
                "sessionNumber must be 1 or greater".into(),
            ));
        }

        let records = self.store.records_for_class(&request.class_id).await?;
        let rows = reconcile(&request.roster, &records, request.session_date);
        let mut result = BatchResult::new();

        let enrolled: HashSet<&UserId> = request.roster.iter().map(|e| &e.user_id).collect();
        for user_id in request.desired.keys().filter(|u| !enrolled.contains(u)) {
            result.failed.push(BatchFailure {
                user_id: user_id.clone(),
                reason: RollcallError::not_found("enrollment", user_id.as_str()).user_message(),
            });
        }

        for row in rows {
            let Some(&desired) = request.desired.get(row.user_id()) else {
                continue;
            };
            let user_id = row.user_id().clone();
            let existing = match row {
                ReconciledRow::Existing(record) if record.is_locked => {
                    result.skipped_locked.push(record.user_id);
                    continue;
                }
                ReconciledRow::Existing(record) if record.is_present == desired => {
                    result.unchanged.push(record.user_id);
                    continue;
                }
                ReconciledRow::Existing(record) => Some(record),
                ReconciledRow::Placeholder { .. } => None,
            };

            let outcome = match existing {
                None => {
                    let mark = MarkRequest {
                        class_id: request.class_id.clone(),
                        user_id: user_id.clone(),
                        session_number: request.session_number,
                        session_date: request.session_date,
                        is_present: desired,
                        notes: self.options.default_notes.clone(),
                    };
                    self.locks.mark(&mark).await
                }
                Some(record) => self.locks.update_presence(&record, desired).await,
            };

            match outcome {
                Ok(_) => result.succeeded.push(user_id),
                Err(e) => {
                    warn!(
                        class_id = %request.class_id,
                        session_date = %request.session_date,
                        user_id = %user_id,
                        error = %e,
                        "attendance write failed"
                    );
                    result.failed.push(BatchFailure {
                        user_id,
                        reason: e.user_message(),
                    });
                }
            }
        }

        let lock_after = request.lock_after.unwrap_or(self.options.lock_after);
        result.lock = if !lock_after {
            LockStatus::NotRequested
        } else if result.succeeded.is_empty() {
            LockStatus::Skipped
        } else {
            if !result.failed.is_empty() {
                warn!(
                    class_id = %request.class_id,
                    session_date = %request.session_date,
                    failed = result.failed.len(),
                    "locking session despite failed writes"
                );
            }
            match self.locks.lock(&request.class_id, request.session_date).await {
                Ok(outcome) => outcome.into(),
                Err(e) => LockStatus::Failed {
                    reason: e.user_message(),
                },
            }
        };

        info!(
            class_id = %request.class_id,
            session_date = %request.session_date,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            skipped_locked = result.skipped_locked.len(),
            unchanged = result.unchanged.len(),
            "attendance batch applied"
        );
        Ok(result)
    }
}
