//! Half-open date-time ranges for querying occurrences.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::DEFAULT_LIST_DAYS;

/// A half-open `[start, end)` range of wall-clock date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    /// The calendar day containing `date`, midnight to midnight.
    pub fn day_of(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        DateRange {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Whether an instance spanning `start..end` overlaps this range.
    ///
    /// A zero-length instance overlaps when its instant lies inside the range.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && (end > self.start || start >= self.start)
    }

    /// Parse CLI bounds into a range.
    /// - `from`: YYYY-MM-DD, defaults to today
    /// - `to`: YYYY-MM-DD (inclusive day), defaults to `from` + DEFAULT_LIST_DAYS
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self, String> {
        let from_date = match from {
            Some(s) => parse_date(s)?,
            None => today,
        };

        let to_date = match to {
            Some(s) => parse_date(s)?,
            None => from_date + Duration::days(DEFAULT_LIST_DAYS - 1),
        };

        if to_date < from_date {
            return Err(format!("'{}' is before '{}'", to_date, from_date));
        }

        Ok(DateRange {
            start: from_date.and_time(NaiveTime::MIN),
            end: (to_date + Duration::days(1)).and_time(NaiveTime::MIN),
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
