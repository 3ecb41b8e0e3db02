//! Reading exported occurrences back with the icalendar crate's parser.

use chrono::NaiveDateTime;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{read_calendar, unfold},
};

use crate::error::{OccurrenceError, OccurrenceResult};

/// The summary/start/end triple carried by an exported occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedOccurrence {
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Parse the first VEVENT of an exported calendar.
pub fn parse_exported(content: &str) -> OccurrenceResult<ExportedOccurrence> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| OccurrenceError::IcsParse(e.to_string()))?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT")
        .ok_or_else(|| OccurrenceError::IcsParse("No VEVENT found".into()))?;

    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .and_then(to_naive)
        .ok_or_else(|| OccurrenceError::IcsParse("Missing or invalid DTSTART".into()))?;

    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .and_then(to_naive)
        .ok_or_else(|| OccurrenceError::IcsParse("Missing or invalid DTEND".into()))?;

    Ok(ExportedOccurrence { summary, start, end })
}

/// Wall-clock value of a DTSTART/DTEND. Date-only values have no time and are rejected.
fn to_naive(dpt: DatePerhapsTime) -> Option<NaiveDateTime> {
    match dpt {
        DatePerhapsTime::Date(_) => None,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Floating(naive) => Some(naive),
            CalendarDateTime::Utc(dt) => Some(dt.naive_utc()),
            CalendarDateTime::WithTimezone { date_time, .. } => Some(date_time),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::{export_occurrence, to_ics_string};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_parse_exported_reads_back_triple() {
        let cal = export_occurrence("Team sync", dt("2024-06-03 09:00"), dt("2024-06-03 09:45"));

        let parsed = parse_exported(&to_ics_string(&cal)).unwrap();

        assert_eq!(
            parsed,
            ExportedOccurrence {
                summary: "Team sync".to_string(),
                start: dt("2024-06-03 09:00"),
                end: dt("2024-06-03 09:45"),
            }
        );
    }

    #[test]
    fn test_parse_exported_accepts_zoned_times() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:test-123
SUMMARY:Lecture
DTSTART;TZID=Europe/Berlin:20240101T100000
DTEND:20240101T110000Z
END:VEVENT
END:VCALENDAR"#;

        let parsed = parse_exported(ics).unwrap();

        assert_eq!(parsed.summary, "Lecture");
        assert_eq!(parsed.start, dt("2024-01-01 10:00"));
        assert_eq!(parsed.end, dt("2024-01-01 11:00"));
    }

    #[test]
    fn test_parse_exported_without_vevent_fails() {
        let ics = "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:TEST\nEND:VCALENDAR\n";

        assert!(matches!(parse_exported(ics), Err(OccurrenceError::IcsParse(_))));
    }
}
