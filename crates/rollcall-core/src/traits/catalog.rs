// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class metadata port.

use async_trait::async_trait;

use crate::error::RollcallError;
use crate::traits::adapter::Adapter;
use crate::types::{ClassId, ClassOffering, SessionView};

/// Read-only access to class schedules and their derived sessions.
#[async_trait]
pub trait ClassCatalog: Adapter {
    /// Fetches the schedule, date bounds and session count of a class.
    async fn class_offering(&self, class_id: &ClassId) -> Result<ClassOffering, RollcallError>;

    /// Lists the class's sessions with their current status, in session order.
    async fn sessions(&self, class_id: &ClassId) -> Result<Vec<SessionView>, RollcallError>;
}
