//! Time handling utilities for coverage metadata and temporal filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Parse an ISO 8601 timestamp. Values without a zone are taken as UTC.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Render a timestamp as ISO 8601 with a `Z` suffix, e.g. "2020-01-01T00:00:00Z".
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// A closed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimePeriod {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    /// Build a period only when both ends are known.
    pub fn from_parts(begin: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        Some(Self::new(begin?, end?))
    }

    /// Whether this period shares at least one instant with `[start, end]`.
    /// Open bounds (`None`) are unbounded.
    pub fn overlaps(&self, start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>) -> bool {
        let after_start = start.map_or(true, |s| &self.end >= s);
        let before_end = end.map_or(true, |e| &self.begin <= e);
        after_start && before_end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_iso8601() {
        let dt = parse_iso8601("2024-01-15T12:00:00Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_iso8601("2020-01-02").unwrap();
        assert_eq!(format_iso8601(&dt), "2020-01-02T00:00:00Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_iso8601("yesterday").is_err());
    }

    #[test]
    fn test_format_round_trips_verbatim() {
        let dt = parse_iso8601("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(format_iso8601(&dt), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_period_requires_both_ends() {
        let begin = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(TimePeriod::from_parts(Some(begin), None).is_none());
        assert!(TimePeriod::from_parts(None, Some(begin)).is_none());
        assert!(TimePeriod::from_parts(Some(begin), Some(begin)).is_some());
    }

    #[test]
    fn test_period_overlaps() {
        let period = TimePeriod::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap(),
        );
        let before = Utc.with_ymd_and_hms(2019, 12, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();

        assert!(period.overlaps(None, None));
        assert!(period.overlaps(Some(&before), Some(&after)));
        assert!(!period.overlaps(Some(&after), None));
        assert!(!period.overlaps(None, Some(&before)));
    }
}
