// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port traits for the external collaborators of the attendance subsystem.
//!
//! All ports extend [`Adapter`] and use `#[async_trait]` for dynamic
//! dispatch compatibility.

pub mod adapter;
pub mod attendance;
pub mod catalog;
pub mod enrollment;

pub use adapter::Adapter;
pub use attendance::AttendanceStore;
pub use catalog::ClassCatalog;
pub use enrollment::EnrollmentDirectory;
