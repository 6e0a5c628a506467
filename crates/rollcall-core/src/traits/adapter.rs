// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every port adapter.

use async_trait::async_trait;

use crate::error::RollcallError;
use crate::types::HealthStatus;

/// Identity and health reporting for an adapter behind one or more ports.
///
/// The REST client serves all three ports from a single instance; the
/// in-memory test store does the same.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, RollcallError>;
}
