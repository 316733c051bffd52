//! Date range handling for temporal layers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, LayerResult};

/// A caller-supplied time window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A range with both bounds open.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range from optional request parameters.
    ///
    /// Empty strings count as absent. A date-only end bound covers the whole
    /// day, so `startDate=2024-03-01&endDate=2024-03-01` selects that day.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> LayerResult<Self> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_bound(s, false)?),
            None => None,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_bound(s, true)?),
            None => None,
        };

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(LayerError::InvalidDateRange(format!(
                    "start {} is after end {}",
                    s.to_rfc3339(),
                    e.to_rfc3339()
                )));
            }
        }

        Ok(Self { start, end })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Inclusive containment check; open bounds always pass.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| instant >= s) && self.end.map_or(true, |e| instant <= e)
    }
}

/// Parse an ISO 8601 instant, naive datetime (UTC) or plain date.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    parse_bound(s, false).ok()
}

fn parse_bound(s: &str, end_of_day: bool) -> LayerResult<DateTime<Utc>> {
    // Full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Without timezone (assume UTC)
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let time = if end_of_day {
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        };
        if let Some(time) = time {
            return Ok(Utc.from_utc_datetime(&date.and_time(time)));
        }
    }

    Err(LayerError::InvalidDateRange(format!(
        "unrecognised date '{}'",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let range = DateRange::from_params(Some("2024-03-01T10:00:00-03:00"), None).unwrap();
        assert_eq!(
            range.start.unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap()
        );
        assert!(range.end.is_none());
    }

    #[test]
    fn test_date_only_end_covers_day() {
        let range = DateRange::from_params(Some("2024-03-01"), Some("2024-03-01")).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(range.contains(noon));
        let next_day = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        assert!(!range.contains(next_day));
    }

    #[test]
    fn test_empty_params_are_unbounded() {
        let range = DateRange::from_params(Some(""), Some("  ")).unwrap();
        assert!(range.is_unbounded());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::from_params(Some("2024-03-02"), Some("2024-03-01")).unwrap_err();
        assert!(matches!(err, LayerError::InvalidDateRange(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(DateRange::from_params(Some("yesterday"), None).is_err());
        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn test_naive_datetime() {
        let dt = parse_instant("2024-03-01T10:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        let dt = parse_instant("2024-03-01 10:00:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }
}
