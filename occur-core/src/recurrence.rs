//! RRULE expansion and reconciliation with persisted exceptions.
//!
//! `RecurrenceRule` turns an RRULE into raw (start, end) pairs for a range.
//! `RuleGenerator` wraps those pairs as occurrences and swaps in any stored
//! exception with the same identity key.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use rrule::RRuleSet;

use crate::constants::MAX_EXPANDED_INSTANCES;
use crate::date_range::DateRange;
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::event::Event;
use crate::generator::Generator;
use crate::occurrence::{Occurrence, OccurrenceKey, sort_occurrences};
use crate::store::ExceptionStore;

/// A recurrence rule anchored at a wall-clock start.
///
/// Times are floating: they are expanded as if they were UTC and never
/// converted, so 09:00 stays 09:00 across DST changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub start: NaiveDateTime,
    pub duration: Duration,
    /// RRULE value without the `RRULE:` prefix, e.g. `FREQ=WEEKLY;BYDAY=MO`
    pub rrule: String,
    pub exdates: Vec<NaiveDateTime>,
}

impl RecurrenceRule {
    pub fn new(start: NaiveDateTime, duration: Duration, rrule: impl Into<String>) -> Self {
        RecurrenceRule {
            start,
            duration,
            rrule: rrule.into(),
            exdates: Vec::new(),
        }
    }

    /// Build an iCalendar-format rule set string for the rrule crate parser.
    fn to_rrule_string(&self) -> String {
        let mut lines = Vec::with_capacity(2 + self.exdates.len());

        // Floating times are fed to the rrule crate as UTC
        lines.push(format!("DTSTART:{}Z", self.start.format("%Y%m%dT%H%M%S")));
        lines.push(format!("RRULE:{}", self.rrule));

        for exdate in &self.exdates {
            lines.push(format!("EXDATE:{}Z", exdate.format("%Y%m%dT%H%M%S")));
        }

        lines.join("\n")
    }

    /// Check that the rule parses and that the duration fits the calendar.
    pub fn validate(&self) -> OccurrenceResult<()> {
        if self.duration < Duration::zero() {
            return Err(OccurrenceError::Recurrence(format!(
                "Negative duration for RRULE '{}'",
                self.rrule
            )));
        }
        self.end_for(self.start)?;
        self.rule_set().map(|_| ())
    }

    fn end_for(&self, start: NaiveDateTime) -> OccurrenceResult<NaiveDateTime> {
        start.checked_add_signed(self.duration).ok_or_else(|| {
            OccurrenceError::Recurrence(format!(
                "Duration of RRULE '{}' overflows the calendar from {}",
                self.rrule, start
            ))
        })
    }

    fn rule_set(&self) -> OccurrenceResult<RRuleSet> {
        self.to_rrule_string().parse().map_err(|e| {
            OccurrenceError::Recurrence(format!("Failed to parse RRULE '{}': {}", self.rrule, e))
        })
    }

    /// Raw (start, end) pairs of instances overlapping `range`, in start order.
    pub fn expand(&self, range: &DateRange) -> OccurrenceResult<Vec<(NaiveDateTime, NaiveDateTime)>> {
        let rule_set = self.rule_set()?;

        // Instances starting up to one duration before the range can still
        // overlap it. Widen by a second on each side; exact filtering happens below.
        let tz: rrule::Tz = Utc.into();
        let after = range
            .start
            .checked_sub_signed(self.duration)
            .and_then(|t| t.checked_sub_signed(Duration::seconds(1)))
            .unwrap_or(NaiveDateTime::MIN)
            .and_utc()
            .with_timezone(&tz);
        let before = range
            .end
            .checked_add_signed(Duration::seconds(1))
            .unwrap_or(NaiveDateTime::MAX)
            .and_utc()
            .with_timezone(&tz);

        let result = rule_set.after(after).before(before).all(MAX_EXPANDED_INSTANCES);

        if result.limited {
            tracing::warn!(
                rrule = %self.rrule,
                limit = MAX_EXPANDED_INSTANCES,
                "Recurrence expansion hit its instance limit; later instances are missing"
            );
        }

        let mut pairs = Vec::with_capacity(result.dates.len());
        for dt in &result.dates {
            let start = dt.naive_utc();
            let end = self.end_for(start)?;
            if range.overlaps(start, end) {
                pairs.push((start, end));
            }
        }

        Ok(pairs)
    }
}

/// Generator for one event driven by a `RecurrenceRule` and an exception store.
pub struct RuleGenerator<S> {
    event: Arc<Event>,
    rule: RecurrenceRule,
    store: S,
}

impl<S: ExceptionStore> RuleGenerator<S> {
    pub fn new(event: Arc<Event>, rule: RecurrenceRule, store: S) -> Self {
        RuleGenerator { event, rule, store }
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn exceptions(&self) -> OccurrenceResult<HashMap<OccurrenceKey, Occurrence>> {
        self.store
            .exceptions(&self.event.id)?
            .iter()
            .map(|record| {
                let occurrence = Occurrence::from_record(self.event.clone(), record)?;
                Ok((occurrence.key(), occurrence))
            })
            .collect()
    }

    /// The occurrence whose unvaried start is `unvaried_start`.
    ///
    /// Returns the stored exception if there is one, else the computed
    /// instance if the rule produces one starting at exactly that instant.
    /// When several exceptions share that start (the rule's duration changed
    /// after they were saved), the one keyed by the rule's current end wins,
    /// then the one with the earliest key.
    #[tracing::instrument(skip(self), fields(event = %self.event.id))]
    pub fn occurrence_at(&self, unvaried_start: NaiveDateTime) -> OccurrenceResult<Option<Occurrence>> {
        let instant = DateRange::new(unvaried_start, unvaried_start + Duration::seconds(1));
        let computed = self
            .rule
            .expand(&instant)?
            .into_iter()
            .find(|(start, _)| *start == unvaried_start)
            .map(|(start, end)| Occurrence::new(self.event.clone(), start, end));

        let mut exceptions = self.exceptions()?;

        if let Some(exception) = computed.as_ref().and_then(|c| exceptions.remove(&c.key())) {
            return Ok(Some(exception));
        }

        let stored = exceptions
            .into_iter()
            .filter(|(key, _)| key.start() == unvaried_start)
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, occurrence)| occurrence);

        Ok(stored.or(computed))
    }
}

impl<S: ExceptionStore> Generator for RuleGenerator<S> {
    fn event(&self) -> &Arc<Event> {
        &self.event
    }

    #[tracing::instrument(skip(self), fields(event = %self.event.id))]
    fn get_occurrences(&self, range: &DateRange) -> OccurrenceResult<Vec<Occurrence>> {
        let mut exceptions = self.exceptions()?;
        let mut occurrences = Vec::new();
        let mut substituted = 0;

        for (start, end) in self.rule.expand(range)? {
            let computed = Occurrence::new(self.event.clone(), start, end);

            match exceptions.remove(&computed.key()) {
                // The exception decides for itself whether it is still in range
                Some(exception) => {
                    substituted += 1;
                    if range.overlaps(exception.start(), exception.end()) {
                        occurrences.push(exception);
                    }
                }
                None => occurrences.push(computed),
            }
        }

        // Exceptions whose original slot is outside the range but whose
        // varied timing was moved into it
        let moved_in = exceptions
            .into_values()
            .filter(|o| range.overlaps(o.start(), o.end()));
        let before = occurrences.len();
        occurrences.extend(moved_in);

        tracing::debug!(
            total = occurrences.len(),
            substituted,
            moved_in = occurrences.len() - before,
            "Generated occurrences"
        );

        sort_occurrences(&mut occurrences);
        Ok(occurrences)
    }
}
