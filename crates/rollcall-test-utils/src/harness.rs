// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end workflow testing.
//!
//! `TestHarness` wires trainer and student views over one
//! [`InMemoryStore`] and a [`FixedClock`], seeded through a builder.

use std::sync::Arc;

use chrono::NaiveTime;
use rollcall_attendance::{BatchOptions, Ports, StudentView, TrainerView};
use rollcall_core::{ClassId, ClassOffering, DayOfWeek, SessionDate, UserId, WeeklySchedule};

use crate::clock::FixedClock;
use crate::store::InMemoryStore;

/// Parses `YYYY-MM-DD`. Panics on malformed input.
pub fn date(raw: &str) -> SessionDate {
    SessionDate::parse(raw).expect("valid test date")
}

/// Mon/Wed/Fri evening class through January 2024, twelve sessions.
///
/// Sessions fall on Jan 1, 3, 5, 8, 10, 12, 15, 17, 19, 22, 24, 26.
pub fn january_offering(id: &str) -> ClassOffering {
    let start = NaiveTime::from_hms_opt(18, 0, 0).expect("valid time");
    let end = NaiveTime::from_hms_opt(19, 0, 0).expect("valid time");
    ClassOffering {
        id: ClassId::from(id),
        start_date: date("2024-01-01"),
        end_date: date("2024-01-31"),
        total_sessions: 12,
        schedule: WeeklySchedule::on_days(
            &[DayOfWeek::MONDAY, DayOfWeek::WEDNESDAY, DayOfWeek::FRIDAY],
            start,
            end,
        ),
        instructor_id: Some(UserId::from("trainer-1")),
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    today: SessionDate,
    classes: Vec<ClassOffering>,
    students: Vec<(ClassId, String, String)>,
    options: BatchOptions,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            today: date("2024-01-03"),
            classes: Vec::new(),
            students: Vec::new(),
            options: BatchOptions {
                lock_after: true,
                default_notes: None,
            },
        }
    }

    /// Pin the clock to `raw` (`YYYY-MM-DD`).
    pub fn today(mut self, raw: &str) -> Self {
        self.today = date(raw);
        self
    }

    pub fn with_class(mut self, offering: ClassOffering) -> Self {
        self.classes.push(offering);
        self
    }

    /// Enroll `(user_id, full_name)` pairs in `class_id`.
    pub fn with_students(mut self, class_id: &str, students: &[(&str, &str)]) -> Self {
        let class_id = ClassId::from(class_id);
        self.students.extend(
            students
                .iter()
                .map(|(user, name)| (class_id.clone(), user.to_string(), name.to_string())),
        );
        self
    }

    /// Whether batch marking locks the date afterwards (default true).
    pub fn lock_after_batch(mut self, lock_after: bool) -> Self {
        self.options.lock_after = lock_after;
        self
    }

    pub fn default_notes(mut self, notes: &str) -> Self {
        self.options.default_notes = Some(notes.to_string());
        self
    }

    /// Build the harness, seeding the store.
    pub async fn build(self) -> TestHarness {
        let clock = Arc::new(FixedClock::new(self.today));
        let store = Arc::new(InMemoryStore::new(clock.clone()));

        for offering in self.classes {
            store.add_class(offering).await;
        }
        for (class_id, user, name) in &self.students {
            store.enroll(class_id, user, name).await;
        }

        TestHarness {
            store,
            clock,
            options: self.options,
        }
    }
}

/// A complete test environment over the in-memory store.
pub struct TestHarness {
    /// Backing store for every port.
    pub store: Arc<InMemoryStore>,
    /// Clock shared by the store and student views.
    pub clock: Arc<FixedClock>,
    /// Options handed to trainer views.
    pub options: BatchOptions,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn ports(&self) -> Ports {
        Ports::from_adapter(self.store.clone())
    }

    pub fn trainer(&self) -> TrainerView {
        TrainerView::new(self.ports(), self.options.clone())
    }

    pub fn student(&self, user_id: &str) -> StudentView {
        StudentView::new(UserId::from(user_id), self.ports(), self.clock.clone())
    }
}
