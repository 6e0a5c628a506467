// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settable clock for date-sensitive tests.

use std::sync::Mutex;

use rollcall_core::{Clock, SessionDate};

/// A clock pinned to a date until a test moves it.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<SessionDate>,
}

impl FixedClock {
    pub fn new(today: SessionDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Parses `YYYY-MM-DD`. Panics on malformed input.
    pub fn at(date: &str) -> Self {
        Self::new(SessionDate::parse(date).expect("valid test date"))
    }

    pub fn set(&self, today: SessionDate) {
        *self.today.lock().expect("clock mutex poisoned") = today;
    }

    /// Moves the clock forward one calendar day.
    pub fn advance_day(&self) {
        let mut today = self.today.lock().expect("clock mutex poisoned");
        if let Some(next) = today.succ() {
            *today = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> SessionDate {
        *self.today.lock().expect("clock mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_to_next_day() {
        let clock = FixedClock::at("2024-01-31");
        clock.advance_day();
        assert_eq!(clock.today().to_string(), "2024-02-01");
    }
}
