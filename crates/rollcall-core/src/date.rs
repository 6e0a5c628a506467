// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar-only date handling.
//!
//! Session dates travel as `YYYY-MM-DD` strings. Some payloads carry full
//! ISO-8601 timestamps instead; only the calendar prefix before `T` is
//! meaningful and the time/offset part is discarded without conversion.
//! All date equality and weekday logic in the workspace goes through
//! [`SessionDate`], never through a timezone-aware instant.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RollcallError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar date with no time-of-day component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionDate(NaiveDate);

impl SessionDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns `None` for out-of-range components (e.g. February 30th).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses `YYYY-MM-DD`, or the calendar prefix of an ISO-8601 timestamp.
    pub fn parse(raw: &str) -> Result<Self, RollcallError> {
        let trimmed = raw.trim();
        let calendar = trimmed
            .split(['T', ' '])
            .next()
            .unwrap_or(trimmed);
        NaiveDate::parse_from_str(calendar, DATE_FORMAT)
            .map(Self)
            .map_err(|_| {
                RollcallError::Validation(format!(
                    "invalid session date `{raw}`: expected YYYY-MM-DD"
                ))
            })
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from(self.0.weekday())
    }

    /// The following calendar day, or `None` at the end of chrono's range.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for SessionDate {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for SessionDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for SessionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Day of the week, Sunday = 0 through Saturday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const TUESDAY: Self = Self(2);
    pub const WEDNESDAY: Self = Self(3);
    pub const THURSDAY: Self = Self(4);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    pub fn new(index: u8) -> Result<Self, RollcallError> {
        if index <= 6 {
            Ok(Self(index))
        } else {
            Err(RollcallError::Validation(format!(
                "day of week must be 0 (Sunday) through 6 (Saturday), got {index}"
            )))
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6
        Self(weekday.num_days_from_sunday() as u8)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = RollcallError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0 => "Sun",
            1 => "Mon",
            2 => "Tue",
            3 => "Wed",
            4 => "Thu",
            5 => "Fri",
            _ => "Sat",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_calendar_date() {
        let d = SessionDate::parse("2024-01-01").unwrap();
        assert_eq!(d, SessionDate::from_ymd(2024, 1, 1).unwrap());
        assert_eq!(d.to_string(), "2024-01-01");
    }

    #[test]
    fn timestamp_keeps_calendar_prefix_without_shifting() {
        // A late-evening UTC instant must not roll into the next day.
        let d = SessionDate::parse("2024-01-01T23:30:00.000Z").unwrap();
        assert_eq!(d.to_string(), "2024-01-01");
        let d = SessionDate::parse("2024-03-10 08:00:00").unwrap();
        assert_eq!(d.to_string(), "2024-03-10");
    }

    #[test]
    fn rejects_garbage() {
        assert!(SessionDate::parse("").is_err());
        assert!(SessionDate::parse("01/02/2024").is_err());
        assert!(SessionDate::parse("2024-02-30").is_err());
    }

    #[test]
    fn weekday_is_sunday_based() {
        // 2024-01-07 was a Sunday.
        let sunday = SessionDate::parse("2024-01-07").unwrap();
        assert_eq!(sunday.day_of_week(), DayOfWeek::SUNDAY);
        let monday = SessionDate::parse("2024-01-01").unwrap();
        assert_eq!(monday.day_of_week(), DayOfWeek::MONDAY);
    }

    #[test]
    fn serde_uses_calendar_string() {
        let d = SessionDate::from_ymd(2024, 5, 9).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2024-05-09\"");
        let back: SessionDate = serde_json::from_str("\"2024-05-09T00:00:00Z\"").unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn day_of_week_bounds() {
        assert!(DayOfWeek::new(6).is_ok());
        assert!(DayOfWeek::new(7).is_err());
        assert!(serde_json::from_str::<DayOfWeek>("9").is_err());
        assert_eq!(serde_json::from_str::<DayOfWeek>("3").unwrap(), DayOfWeek::WEDNESDAY);
    }
}
