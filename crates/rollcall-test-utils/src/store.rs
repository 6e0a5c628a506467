// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory adapter for deterministic testing.
//!
//! `InMemoryStore` implements every attendance port over plain collections,
//! upserting on `(class, user, session number)` the way the remote API does,
//! so workflows can be exercised without a server.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rollcall_attendance::derive_session_views;
use rollcall_core::{
    Adapter, AttendanceRecord, AttendanceStore, ClassCatalog, ClassId, ClassOffering, Clock,
    Enrollment, EnrollmentDirectory, EnrollmentId, HealthStatus, MarkRequest, RecordId,
    RollcallError, SessionDate, SessionView, StudentProfile, UserId,
};

#[derive(Default)]
struct State {
    offerings: HashMap<ClassId, ClassOffering>,
    rosters: HashMap<ClassId, Vec<Enrollment>>,
    records: Vec<AttendanceRecord>,
    cancelled: HashMap<ClassId, BTreeSet<SessionDate>>,
    failing_users: HashSet<UserId>,
    writes: usize,
}

/// A store holding classes, rosters, and attendance rows in memory.
///
/// Writes for users registered with [`fail_for_user`](Self::fail_for_user)
/// return a transport error without touching state.
pub struct InMemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store whose session statuses follow `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    /// Register a class offering.
    pub async fn add_class(&self, offering: ClassOffering) {
        let mut state = self.state.lock().await;
        state.rosters.entry(offering.id.clone()).or_default();
        state.offerings.insert(offering.id.clone(), offering);
    }

    /// Enroll a student; `name` becomes the populated profile.
    pub async fn enroll(&self, class_id: &ClassId, user_id: &str, name: &str) {
        let mut state = self.state.lock().await;
        let roster = state.rosters.entry(class_id.clone()).or_default();
        roster.push(Enrollment {
            id: EnrollmentId(format!("{class_id}:{user_id}")),
            class_id: class_id.clone(),
            user_id: UserId::from(user_id),
            payment_status: true,
            student: Some(StudentProfile {
                full_name: name.to_string(),
                email: None,
            }),
        });
    }

    /// Insert a row as-is, bypassing upsert. Used to seed locked history.
    pub async fn insert_record(&self, record: AttendanceRecord) {
        self.state.lock().await.records.push(record);
    }

    /// Mark `date` as cancelled in derived session views.
    pub async fn cancel_session(&self, class_id: &ClassId, date: SessionDate) {
        self.state
            .lock()
            .await
            .cancelled
            .entry(class_id.clone())
            .or_default()
            .insert(date);
    }

    /// Make every subsequent write for `user_id` fail.
    pub async fn fail_for_user(&self, user_id: &str) {
        self.state
            .lock()
            .await
            .failing_users
            .insert(UserId::from(user_id));
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failing_users.clear();
    }

    /// Snapshot of every stored row.
    pub async fn records(&self) -> Vec<AttendanceRecord> {
        self.state.lock().await.records.clone()
    }

    /// Number of successful writes (mark, update, lock) so far.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }
}

fn injected_failure(user_id: &UserId) -> RollcallError {
    RollcallError::transport(
        "could not reach the attendance service, check your connection",
        std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            format!("injected failure for {user_id}"),
        ),
    )
}

#[async_trait]
impl Adapter for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn health_check(&self) -> Result<HealthStatus, RollcallError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ClassCatalog for InMemoryStore {
    async fn class_offering(&self, class_id: &ClassId) -> Result<ClassOffering, RollcallError> {
        self.state
            .lock()
            .await
            .offerings
            .get(class_id)
            .cloned()
            .ok_or_else(|| RollcallError::not_found("class", class_id.as_str()))
    }

    async fn sessions(&self, class_id: &ClassId) -> Result<Vec<SessionView>, RollcallError> {
        let state = self.state.lock().await;
        let offering = state
            .offerings
            .get(class_id)
            .ok_or_else(|| RollcallError::not_found("class", class_id.as_str()))?;
        let cancelled = state.cancelled.get(class_id).cloned().unwrap_or_default();
        derive_session_views(offering, self.clock.today(), &cancelled, &state.records)
    }
}

#[async_trait]
impl EnrollmentDirectory for InMemoryStore {
    async fn roster(&self, class_id: &ClassId) -> Result<Vec<Enrollment>, RollcallError> {
        self.state
            .lock()
            .await
            .rosters
            .get(class_id)
            .cloned()
            .ok_or_else(|| RollcallError::not_found("class", class_id.as_str()))
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn records_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<AttendanceRecord>, RollcallError> {
        Ok(self
            .state
            .lock()
            .await
            .records
            .iter()
            .filter(|r| &r.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn mark(&self, request: &MarkRequest) -> Result<AttendanceRecord, RollcallError> {
        request.validate()?;
        let mut state = self.state.lock().await;
        if state.failing_users.contains(&request.user_id) {
            return Err(injected_failure(&request.user_id));
        }
        state.writes += 1;

        let now = chrono::Utc::now();
        let existing = state
            .records
            .iter_mut()
            .find(|r| r.has_key(&request.class_id, &request.user_id, request.session_number));

        let record = match existing {
            Some(record) => {
                record.session_date = request.session_date;
                record.is_present = request.is_present;
                record.notes = request.notes.clone();
                record.marked_at = Some(now);
                record.clone()
            }
            None => {
                let record = AttendanceRecord {
                    id: RecordId(uuid::Uuid::new_v4().to_string()),
                    class_id: request.class_id.clone(),
                    user_id: request.user_id.clone(),
                    session_number: request.session_number,
                    session_date: request.session_date,
                    is_present: request.is_present,
                    is_locked: false,
                    marked_at: Some(now),
                    notes: request.notes.clone(),
                };
                state.records.push(record.clone());
                record
            }
        };
        Ok(record)
    }

    async fn update_presence(
        &self,
        record: &AttendanceRecord,
        is_present: bool,
    ) -> Result<AttendanceRecord, RollcallError> {
        let record_id = &record.id;
        let mut state = self.state.lock().await;
        let index = state
            .records
            .iter()
            .position(|r| &r.id == record_id)
            .ok_or_else(|| RollcallError::not_found("attendance record", record_id.as_str()))?;
        let user_id = state.records[index].user_id.clone();
        if state.failing_users.contains(&user_id) {
            return Err(injected_failure(&user_id));
        }
        state.writes += 1;

        let record = &mut state.records[index];
        record.is_present = is_present;
        record.marked_at = Some(chrono::Utc::now());
        Ok(record.clone())
    }

    async fn lock_session(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<(), RollcallError> {
        let mut state = self.state.lock().await;
        state.writes += 1;
        state
            .records
            .iter_mut()
            .filter(|r| &r.class_id == class_id && r.session_date == session_date)
            .for_each(|r| r.is_locked = true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn request(user: &str, number: u32, present: bool) -> MarkRequest {
        MarkRequest {
            class_id: ClassId::from("c1"),
            user_id: UserId::from(user),
            session_number: number,
            session_date: SessionDate::parse("2024-01-03").unwrap(),
            is_present: present,
            notes: None,
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new(Arc::new(FixedClock::at("2024-01-03")))
    }

    #[tokio::test]
    async fn mark_upserts_on_triple() {
        let store = store();
        let first = store.mark(&request("u1", 2, true)).await.unwrap();
        let second = store.mark(&request("u1", 2, false)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.records().await.len(), 1);
        assert!(!store.records().await[0].is_present);
    }

    #[tokio::test]
    async fn injected_failure_leaves_state_untouched() {
        let store = store();
        store.fail_for_user("u1").await;

        let err = store.mark(&request("u1", 2, true)).await.unwrap_err();
        assert!(matches!(err, RollcallError::Transport { .. }));
        assert!(store.records().await.is_empty());
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_class_is_not_found() {
        let err = store().roster(&ClassId::from("nope")).await.unwrap_err();
        assert!(matches!(err, RollcallError::NotFound { entity: "class", .. }));
    }
}
