// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability-based entry points over the shared attendance model.
//!
//! [`TrainerView`] can read rosters, batch-mark, and lock. [`StudentView`]
//! can read sessions and its own attendance, and check itself in.

use std::collections::BTreeMap;
use std::sync::Arc;

use rollcall_core::{
    AttendanceRecord, AttendanceStore, ClassCatalog, ClassId, Clock, Enrollment,
    EnrollmentDirectory, RollcallError, SessionDate, SessionView, UserId,
};
use serde::Serialize;

use crate::batch::{BatchMarkWorkflow, BatchOptions, BatchRequest, BatchResult};
use crate::checkin::{CheckInOutcome, CheckInWorkflow};
use crate::lock::{LockOutcome, SessionLockController, SessionState};
use crate::reconcile::{reconcile, tally, ReconciledRow, RosterTally};
use crate::schedule::SessionPlan;
use crate::summary::{summarize, AttendanceSummary};

/// The three external collaborators, shared by both views.
#[derive(Clone)]
pub struct Ports {
    pub catalog: Arc<dyn ClassCatalog>,
    pub directory: Arc<dyn EnrollmentDirectory>,
    pub store: Arc<dyn AttendanceStore>,
}

impl Ports {
    /// Uses one adapter for all three ports.
    pub fn from_adapter<A>(adapter: Arc<A>) -> Self
    where
        A: ClassCatalog + EnrollmentDirectory + AttendanceStore,
    {
        Self {
            catalog: adapter.clone(),
            directory: adapter.clone(),
            store: adapter,
        }
    }
}

/// A roster row with the enrollment it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub enrollment: Enrollment,
    pub row: ReconciledRow,
}

/// Everything a trainer needs to review one session date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoster {
    pub class_id: ClassId,
    pub session_date: SessionDate,
    pub session_number: Option<u32>,
    pub state: SessionState,
    pub tally: RosterTally,
    pub entries: Vec<RosterEntry>,
}

/// Trainer capabilities: review, mark, lock.
#[derive(Clone)]
pub struct TrainerView {
    ports: Ports,
    batch: BatchMarkWorkflow,
}

impl TrainerView {
    pub fn new(ports: Ports, options: BatchOptions) -> Self {
        let batch = BatchMarkWorkflow::new(ports.store.clone(), options);
        Self { ports, batch }
    }

    fn locks(&self) -> &SessionLockController {
        self.batch.lock_controller()
    }

    pub async fn plan(&self, class_id: &ClassId) -> Result<SessionPlan, RollcallError> {
        let offering = self.ports.catalog.class_offering(class_id).await?;
        SessionPlan::for_offering(&offering)
    }

    /// Reconciled roster for one date.
    pub async fn session_roster(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<SessionRoster, RollcallError> {
        let roster = self.ports.directory.roster(class_id).await?;
        let records = self.ports.store.records_for_class(class_id).await?;
        let session_number = self.plan(class_id).await?.number_on(session_date);

        let rows = reconcile(&roster, &records, session_date);
        let on_date: Vec<AttendanceRecord> = records
            .into_iter()
            .filter(|r| r.session_date == session_date)
            .collect();

        Ok(SessionRoster {
            class_id: class_id.clone(),
            session_date,
            session_number,
            state: SessionState::of(&on_date),
            tally: tally(&rows),
            entries: roster
                .into_iter()
                .zip(rows)
                .map(|(enrollment, row)| RosterEntry { enrollment, row })
                .collect(),
        })
    }

    /// Batch-marks one session. The date is resolved from the schedule when
    /// not given.
    pub async fn mark_session(
        &self,
        class_id: &ClassId,
        session_number: u32,
        session_date: Option<SessionDate>,
        desired: BTreeMap<UserId, bool>,
        lock_after: Option<bool>,
    ) -> Result<BatchResult, RollcallError> {
        let session_date = match session_date {
            Some(date) => date,
            None => self.plan(class_id).await?.require_date(session_number)?,
        };
        let roster = self.ports.directory.roster(class_id).await?;
        self.batch
            .apply(BatchRequest {
                class_id: class_id.clone(),
                session_date,
                session_number,
                roster,
                desired,
                lock_after,
            })
            .await
    }

    pub async fn lock(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<LockOutcome, RollcallError> {
        self.locks().lock(class_id, session_date).await
    }

    pub async fn lock_state(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<SessionState, RollcallError> {
        self.locks().state(class_id, session_date).await
    }
}

/// Student capabilities: read sessions and own history, self check-in.
#[derive(Clone)]
pub struct StudentView {
    user_id: UserId,
    ports: Ports,
    clock: Arc<dyn Clock>,
    check_in: CheckInWorkflow,
}

impl StudentView {
    pub fn new(user_id: UserId, ports: Ports, clock: Arc<dyn Clock>) -> Self {
        let check_in =
            CheckInWorkflow::new(ports.catalog.clone(), ports.store.clone(), clock.clone());
        Self {
            user_id,
            ports,
            clock,
            check_in,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub async fn sessions(&self, class_id: &ClassId) -> Result<Vec<SessionView>, RollcallError> {
        self.ports.catalog.sessions(class_id).await
    }

    /// This student's records for a class, in session order.
    pub async fn my_attendance(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<AttendanceRecord>, RollcallError> {
        let mut records: Vec<AttendanceRecord> = self
            .ports
            .store
            .records_for_class(class_id)
            .await?
            .into_iter()
            .filter(|r| r.user_id == self.user_id)
            .collect();
        records.sort_by_key(|r| (r.session_number, r.session_date));
        Ok(records)
    }

    pub async fn summary(&self, class_id: &ClassId) -> Result<AttendanceSummary, RollcallError> {
        let offering = self.ports.catalog.class_offering(class_id).await?;
        let plan = SessionPlan::for_offering(&offering)?;
        let records = self.ports.store.records_for_class(class_id).await?;
        Ok(summarize(&plan, &records, &self.user_id, self.clock.today()))
    }

    /// Checks in for `session_number`; the candidate date defaults to today.
    pub async fn check_in(
        &self,
        class_id: &ClassId,
        session_number: u32,
        candidate_date: Option<SessionDate>,
    ) -> Result<CheckInOutcome, RollcallError> {
        let candidate_date = candidate_date.unwrap_or_else(|| self.clock.today());
        self.check_in
            .self_check_in(class_id, &self.user_id, session_number, candidate_date)
            .await
    }
}
