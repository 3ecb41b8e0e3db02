use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use occur_core::date_range::DateRange;
use occur_core::generator::{Generator, visible};
use occur_core::ics::{parse_exported, to_ics_string};
use occur_core::recurrence::{RecurrenceRule, RuleGenerator};
use occur_core::store::{ExceptionStore, FileStore};
use occur_core::{Event, EventKind, EventVariation, OccurrenceError};

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn lecture() -> Arc<Event> {
    let mut event = Event::new("lecture", "Lecture", EventKind::Variable);
    event.location = Some("Room 101".to_string());
    event.variations.push(Arc::new(EventVariation {
        id: "guest".to_string(),
        title: Some("Guest lecture".to_string()),
        description: None,
        location: Some("Main hall".to_string()),
        reason: "Guest speaker".to_string(),
    }));
    Arc::new(event)
}

fn weekly_rule() -> RecurrenceRule {
    RecurrenceRule::new(dt("2024-01-01 10:00"), Duration::minutes(90), "FREQ=WEEKLY;BYDAY=MO")
}

fn january() -> DateRange {
    DateRange::new(dt("2024-01-01 00:00"), dt("2024-02-01 00:00"))
}

#[test_log::test]
fn exceptions_survive_a_fresh_generator() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(lecture(), weekly_rule(), FileStore::new(dir.path()));

    let mondays = generator.get_occurrences(&january()).unwrap();
    assert_eq!(mondays.len(), 5);

    // Cancel the second, move the third to Tuesday, vary the fourth
    let mut cancelled = mondays[1].clone();
    cancelled.cancel(generator.store()).unwrap();

    let mut moved = mondays[2].clone();
    moved.set_varied_start(dt("2024-01-16 09:00"));
    moved.set_varied_end(dt("2024-01-16 11:00"));
    moved.save(generator.store()).unwrap();

    let mut varied = mondays[3].clone();
    let guest = varied.unvaried_event().variation("guest").unwrap().clone();
    varied.set_varied_event(Some(guest)).unwrap();
    varied.save(generator.store()).unwrap();

    assert_eq!(generator.store().exceptions("lecture").unwrap().len(), 3);

    let fresh = RuleGenerator::new(lecture(), weekly_rule(), FileStore::new(dir.path()));
    let listed = fresh.get_occurrences(&january()).unwrap();

    assert_eq!(listed.len(), 5);
    assert_eq!(listed, mondays);
    assert!(!listed[0].is_varied());
    assert_eq!(listed[1].reason(), "Cancelled");
    assert_eq!(listed[2].start(), dt("2024-01-16 09:00"));
    assert_eq!(
        listed[2].reason(),
        "new date, starts earlier at 09:00, ends earlier at 11:00"
    );
    assert_eq!(listed[3].reason(), "Guest speaker");
    assert_eq!(listed[3].merged_event().location(), Some("Main hall"));
    // Linking a variation alone does not change timing
    assert!(!listed[3].is_varied());
}

#[test_log::test]
fn uncancel_restores_the_instance() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(lecture(), weekly_rule(), FileStore::new(dir.path()));
    let mut occ = generator.occurrence_at(dt("2024-01-08 10:00")).unwrap().unwrap();

    occ.cancel(generator.store()).unwrap();
    occ.uncancel(generator.store()).unwrap();
    occ.uncancel(generator.store()).unwrap();

    let stored = generator.occurrence_at(dt("2024-01-08 10:00")).unwrap().unwrap();
    assert!(!stored.is_cancelled());
    assert!(!stored.is_varied());
    assert_eq!(stored.reason(), "");
}

#[test_log::test]
fn generated_ids_follow_each_day() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(
        Arc::new(Event::new("clinic", "Clinic", EventKind::Fixed)),
        RecurrenceRule::new(dt("2024-03-04 08:00"), Duration::minutes(45), "FREQ=DAILY;BYHOUR=8,11,14,17"),
        FileStore::new(dir.path()),
    );
    let day = DateRange::day_of(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

    let occurrences = generator.get_occurrences(&day).unwrap();

    assert_eq!(occurrences.len(), 4);
    for (n, occ) in occurrences.iter().enumerate() {
        assert_eq!(occ.generated_id(&generator).unwrap(), n);
    }
}

#[test_log::test]
fn hidden_occurrences_stay_out_of_lists() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(lecture(), weekly_rule(), FileStore::new(dir.path()));
    let mut occ = generator.occurrence_at(dt("2024-01-15 10:00")).unwrap().unwrap();
    occ.set_hide_from_lists(true);
    occ.save(generator.store()).unwrap();

    let all = generator.get_occurrences(&january()).unwrap();
    let shown = visible(all.clone());

    assert_eq!(all.len(), 5);
    assert_eq!(shown.len(), 4);
    assert!(all.iter().any(|o| o.hide_from_lists() && !o.is_cancelled()));
}

#[test_log::test]
fn fixed_event_rejects_variation() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(
        Arc::new(Event::new("standup", "Standup", EventKind::Fixed)),
        RecurrenceRule::new(dt("2024-01-01 09:00"), Duration::minutes(15), "FREQ=DAILY"),
        FileStore::new(dir.path()),
    );
    let mut occ = generator.occurrence_at(dt("2024-01-02 09:00")).unwrap().unwrap();
    let variation = lecture().variations[0].clone();

    let result = occ.set_varied_event(Some(variation));

    assert!(matches!(result, Err(OccurrenceError::UnsupportedOperation(_))));
    assert!(generator.store().exceptions("standup").unwrap().is_empty());
}

#[test_log::test]
fn export_round_trips_the_triple() {
    let dir = tempfile::tempdir().unwrap();
    let generator = RuleGenerator::new(lecture(), weekly_rule(), FileStore::new(dir.path()));
    let mut occ = generator.occurrence_at(dt("2024-01-22 10:00")).unwrap().unwrap();
    let guest = occ.unvaried_event().variation("guest").unwrap().clone();
    occ.set_varied_event(Some(guest)).unwrap();
    occ.set_varied_end(dt("2024-01-22 12:00"));

    let exported = parse_exported(&to_ics_string(&occ.as_icalendar())).unwrap();

    assert_eq!(exported.summary, "Guest lecture");
    assert_eq!(exported.start, dt("2024-01-22 10:00"));
    assert_eq!(exported.end, dt("2024-01-22 12:00"));
}
