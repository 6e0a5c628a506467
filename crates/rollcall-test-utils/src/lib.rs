// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rollcall integration tests.
//!
//! Provides an in-memory adapter and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a running API.
//!
//! # Components
//!
//! - [`InMemoryStore`] - All three ports over plain collections, with failure injection
//! - [`FixedClock`] - A clock that only moves when told to
//! - [`TestHarness`] - Trainer and student views wired over the store

pub mod clock;
pub mod harness;
pub mod store;

pub use clock::FixedClock;
pub use harness::{date, january_offering, TestHarness};
pub use store::InMemoryStore;
