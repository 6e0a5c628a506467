// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enrollment roster port.

use async_trait::async_trait;

use crate::error::RollcallError;
use crate::traits::adapter::Adapter;
use crate::types::{ClassId, Enrollment};

/// Read-only access to the students enrolled in a class.
#[async_trait]
pub trait EnrollmentDirectory: Adapter {
    /// Returns the roster in the directory's display order.
    async fn roster(&self, class_id: &ClassId) -> Result<Vec<Enrollment>, RollcallError>;
}
