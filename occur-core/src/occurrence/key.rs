use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Identity of one occurrence: its event and its unvaried start and end.
///
/// The key never changes when an occurrence is moved, so a generator can
/// find the persisted exception for an instance however far its varied
/// times have drifted. Absent end components are stored already defaulted
/// to the start, so two keys are equal exactly when their occurrences are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub event_id: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
}

impl OccurrenceKey {
    pub fn new(event_id: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        OccurrenceKey {
            event_id: event_id.into(),
            start_date: start.date(),
            start_time: start.time(),
            end_date: end.date(),
            end_time: end.time(),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start_time)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time)
    }

    /// Filesystem-safe name for this key, unique per event.
    /// Format: `YYYYMMDDTHHMMSS__YYYYMMDDTHHMMSS`
    pub fn file_stem(&self) -> String {
        format!(
            "{}__{}",
            self.start().format("%Y%m%dT%H%M%S"),
            self.end().format("%Y%m%dT%H%M%S")
        )
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_id, self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let key = OccurrenceKey::new("standup", start, end);

        assert_eq!(key.file_stem(), "20240101T090000__20240101T103000");
        assert_eq!(key.to_string(), "standup@20240101T090000__20240101T103000");
        assert_eq!(key.start(), start);
        assert_eq!(key.end(), end);
    }
}
