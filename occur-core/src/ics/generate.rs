//! ICS generation.

use chrono::NaiveDateTime;
use icalendar::{Calendar, Component};

const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Build a calendar holding one VEVENT with a summary and floating start/end.
pub fn export_occurrence(summary: &str, start: NaiveDateTime, end: NaiveDateTime) -> Calendar {
    let mut ics_event = icalendar::Event::new();
    ics_event.summary(summary);

    // Floating date-times (no Z, no TZID): occurrences are wall-clock times
    ics_event.add_property("DTSTART", start.format(FLOATING_FORMAT).to_string());
    ics_event.add_property("DTEND", end.format(FLOATING_FORMAT).to_string());

    let mut cal = Calendar::new();
    cal.push(ics_event.done());
    cal.done()
}

/// Serialize a calendar, replacing the icalendar crate's PRODID and dropping
/// CALSCALE:GREGORIAN (it's the default).
pub fn to_ics_string(cal: &Calendar) -> String {
    let ics = cal.to_string();
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:OCCUR\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_export_has_summary_and_floating_times() {
        let cal = export_occurrence("Standup", dt("2025-03-20 15:00"), dt("2025-03-20 16:00"));
        let ics = to_ics_string(&cal);

        assert!(ics.contains("BEGIN:VEVENT"), "ICS:\n{}", ics);
        assert!(ics.contains("SUMMARY:Standup"), "ICS:\n{}", ics);
        assert!(
            ics.contains("DTSTART:20250320T150000\r\n"),
            "DTSTART should be floating. ICS:\n{}",
            ics
        );
        assert!(
            ics.contains("DTEND:20250320T160000\r\n"),
            "DTEND should be floating. ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_to_ics_string_strips_bloat() {
        let cal = export_occurrence("Standup", dt("2025-03-20 15:00"), dt("2025-03-20 16:00"));
        let ics = to_ics_string(&cal);

        assert!(ics.contains("PRODID:OCCUR\r\n"), "ICS:\n{}", ics);
        assert!(!ics.contains("CALSCALE"), "ICS:\n{}", ics);
        assert_eq!(ics.lines().filter(|l| l.starts_with("PRODID")).count(), 1);
    }
}
