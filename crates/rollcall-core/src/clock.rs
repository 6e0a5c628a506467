// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of "today" for date-sensitive workflows.

use crate::date::SessionDate;

/// Supplies the caller's current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> SessionDate;
}

/// Reads the local wall clock; the calendar date is taken in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> SessionDate {
        SessionDate::new(chrono::Local::now().date_naive())
    }
}
