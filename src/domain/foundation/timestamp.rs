//! Wall-clock instants as stored in the roster document.
//!
//! Unban times are naive local times with second precision. They are compared
//! against the local system clock with no timezone conversion.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Text format used for every persisted instant.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable naive local point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTimestamp(NaiveDateTime);

impl LocalTimestamp {
    /// Creates a timestamp for the current local moment, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Creates a timestamp from a naive datetime, truncated to seconds.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parses the persisted `YYYY-MM-DD HH:MM:SS` form.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("timestamp", e.to_string()))
    }

    /// Returns the inner datetime.
    pub fn as_datetime(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Signed duration from `other` to `self`.
    pub fn duration_since(&self, other: &LocalTimestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Fractional hours from `other` to `self`; negative when `self` is earlier.
    pub fn hours_since(&self, other: &LocalTimestamp) -> f64 {
        self.duration_since(other).num_seconds() as f64 / 3600.0
    }

    pub fn plus(&self, offset: Duration) -> Self {
        Self(self.0 + offset)
    }

    pub fn plus_hours(&self, hours: i64) -> Self {
        self.plus(Duration::hours(hours))
    }

    pub fn plus_days(&self, days: i64) -> Self {
        self.plus(Duration::days(days))
    }

    pub fn minus_hours(&self, hours: i64) -> Self {
        self.plus(Duration::hours(-hours))
    }
}

impl fmt::Display for LocalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for LocalTimestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LocalTimestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTimestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parse_reads_persisted_format() {
        let ts = LocalTimestamp::parse("2024-01-15 10:30:05").unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().hour(), 10);
        assert_eq!(ts.as_datetime().second(), 5);
    }

    #[test]
    fn parse_rejects_other_formats() {
        assert!(LocalTimestamp::parse("2024-01-15T10:30:05Z").is_err());
        assert!(LocalTimestamp::parse("tomorrow").is_err());
        assert!(LocalTimestamp::parse("").is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let ts = LocalTimestamp::parse("2024-02-29 23:59:59").unwrap();
        assert_eq!(ts.to_string(), "2024-02-29 23:59:59");
        assert_eq!(LocalTimestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn now_has_no_subsecond_part() {
        let ts = LocalTimestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn hours_since_is_signed() {
        let base = LocalTimestamp::parse("2024-01-15 00:00:00").unwrap();
        assert_eq!(base.plus_hours(36).hours_since(&base), 36.0);
        assert_eq!(base.minus_hours(5).hours_since(&base), -5.0);
    }

    #[test]
    fn serde_uses_text_form() {
        let ts = LocalTimestamp::parse("2024-01-15 10:30:00").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-15 10:30:00\"");
        let back: LocalTimestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
