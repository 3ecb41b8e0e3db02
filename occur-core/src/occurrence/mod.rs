//! Occurrences: individual dated instances of a recurring event.
//!
//! Occurrences are usually not persisted, since an event that repeats with no
//! end date has infinitely many of them. They are built on demand by the
//! event's generator. An occurrence that is exceptional in any way (moved,
//! cancelled, or linked to an `EventVariation`) is saved to an
//! `ExceptionStore`, and the generator substitutes it for the computed
//! instance with the same `OccurrenceKey` on later queries.
//!
//! Every occurrence carries two timings. The *unvaried* timing is what the
//! recurrence rule produced and forms the identity key. The *varied* timing
//! is the currently effective one and is what ordering, display and export
//! use.

mod key;
mod reason;
mod record;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::date_range::DateRange;
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::event::{Event, EventVariation, MergedEvent};
use crate::generator::Generator;
use crate::store::ExceptionStore;

pub use key::OccurrenceKey;
pub use reason::ReasonClause;
pub use record::OccurrenceRecord;

const DAY_FORMAT: &str = "%a, %d %b %Y";
const DAY_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M";

/// Variation capability of an occurrence, fixed by its event's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Variation {
    /// The event does not support variations.
    Fixed,
    /// The event supports variations; one may be linked.
    Variable(Option<Arc<EventVariation>>),
}

impl Variation {
    fn for_event(event: &Event) -> Self {
        if event.supports_variations() {
            Variation::Variable(None)
        } else {
            Variation::Fixed
        }
    }

    pub fn get(&self) -> Option<&Arc<EventVariation>> {
        match self {
            Variation::Fixed => None,
            Variation::Variable(v) => v.as_ref(),
        }
    }
}

/// One instance of an event in time.
#[derive(Debug, Clone)]
pub struct Occurrence {
    event: Arc<Event>,

    unvaried_start_date: NaiveDate,
    unvaried_start_time: NaiveTime,
    unvaried_end_date: Option<NaiveDate>,
    unvaried_end_time: Option<NaiveTime>,

    varied_start_date: NaiveDate,
    varied_start_time: NaiveTime,
    varied_end_date: Option<NaiveDate>,
    varied_end_time: Option<NaiveTime>,

    cancelled: bool,
    hide_from_lists: bool,
    variation: Variation,
}

/// Builder for `Occurrence`. Any varied field left unset is copied from its
/// unvaried counterpart when `build` is called.
#[derive(Debug, Clone)]
pub struct OccurrenceBuilder {
    event: Arc<Event>,
    unvaried_start_date: Option<NaiveDate>,
    unvaried_start_time: Option<NaiveTime>,
    unvaried_end_date: Option<NaiveDate>,
    unvaried_end_time: Option<NaiveTime>,
    varied_start_date: Option<NaiveDate>,
    varied_start_time: Option<NaiveTime>,
    varied_end_date: Option<NaiveDate>,
    varied_end_time: Option<NaiveTime>,
    cancelled: bool,
    hide_from_lists: bool,
    varied_event: Option<Arc<EventVariation>>,
}

impl OccurrenceBuilder {
    pub fn unvaried_start(mut self, start: NaiveDateTime) -> Self {
        self.unvaried_start_date = Some(start.date());
        self.unvaried_start_time = Some(start.time());
        self
    }

    pub fn unvaried_start_date(mut self, date: NaiveDate) -> Self {
        self.unvaried_start_date = Some(date);
        self
    }

    pub fn unvaried_start_time(mut self, time: NaiveTime) -> Self {
        self.unvaried_start_time = Some(time);
        self
    }

    pub fn unvaried_end(mut self, end: NaiveDateTime) -> Self {
        self.unvaried_end_date = Some(end.date());
        self.unvaried_end_time = Some(end.time());
        self
    }

    pub fn unvaried_end_date(mut self, date: NaiveDate) -> Self {
        self.unvaried_end_date = Some(date);
        self
    }

    pub fn unvaried_end_time(mut self, time: NaiveTime) -> Self {
        self.unvaried_end_time = Some(time);
        self
    }

    pub fn varied_start(mut self, start: NaiveDateTime) -> Self {
        self.varied_start_date = Some(start.date());
        self.varied_start_time = Some(start.time());
        self
    }

    pub fn varied_start_date(mut self, date: NaiveDate) -> Self {
        self.varied_start_date = Some(date);
        self
    }

    pub fn varied_start_time(mut self, time: NaiveTime) -> Self {
        self.varied_start_time = Some(time);
        self
    }

    pub fn varied_end(mut self, end: NaiveDateTime) -> Self {
        self.varied_end_date = Some(end.date());
        self.varied_end_time = Some(end.time());
        self
    }

    pub fn varied_end_date(mut self, date: NaiveDate) -> Self {
        self.varied_end_date = Some(date);
        self
    }

    pub fn varied_end_time(mut self, time: NaiveTime) -> Self {
        self.varied_end_time = Some(time);
        self
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn hide_from_lists(mut self, hide: bool) -> Self {
        self.hide_from_lists = hide;
        self
    }

    pub fn varied_event(mut self, variation: Arc<EventVariation>) -> Self {
        self.varied_event = Some(variation);
        self
    }

    pub fn build(self) -> OccurrenceResult<Occurrence> {
        let unvaried_start_date = self.unvaried_start_date.ok_or_else(|| {
            OccurrenceError::Malformed(format!(
                "occurrence of '{}' has no unvaried start date",
                self.event.id
            ))
        })?;
        let unvaried_start_time = self.unvaried_start_time.ok_or_else(|| {
            OccurrenceError::Malformed(format!(
                "occurrence of '{}' has no unvaried start time",
                self.event.id
            ))
        })?;

        let mut occurrence = Occurrence {
            variation: Variation::for_event(&self.event),
            event: self.event,
            unvaried_start_date,
            unvaried_start_time,
            unvaried_end_date: self.unvaried_end_date,
            unvaried_end_time: self.unvaried_end_time,
            varied_start_date: self.varied_start_date.unwrap_or(unvaried_start_date),
            varied_start_time: self.varied_start_time.unwrap_or(unvaried_start_time),
            varied_end_date: self.varied_end_date.or(self.unvaried_end_date),
            varied_end_time: self.varied_end_time.or(self.unvaried_end_time),
            cancelled: self.cancelled,
            hide_from_lists: self.hide_from_lists,
        };

        if let Some(variation) = self.varied_event {
            occurrence.set_varied_event(Some(variation))?;
        }

        Ok(occurrence)
    }
}

impl Occurrence {
    pub fn builder(event: Arc<Event>) -> OccurrenceBuilder {
        OccurrenceBuilder {
            event,
            unvaried_start_date: None,
            unvaried_start_time: None,
            unvaried_end_date: None,
            unvaried_end_time: None,
            varied_start_date: None,
            varied_start_time: None,
            varied_end_date: None,
            varied_end_time: None,
            cancelled: false,
            hide_from_lists: false,
            varied_event: None,
        }
    }

    /// An unvaried occurrence spanning `start..end`, as a generator produces it.
    pub fn new(event: Arc<Event>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Occurrence {
            variation: Variation::for_event(&event),
            event,
            unvaried_start_date: start.date(),
            unvaried_start_time: start.time(),
            unvaried_end_date: Some(end.date()),
            unvaried_end_time: Some(end.time()),
            varied_start_date: start.date(),
            varied_start_time: start.time(),
            varied_end_date: Some(end.date()),
            varied_end_time: Some(end.time()),
            cancelled: false,
            hide_from_lists: false,
        }
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey::new(&self.event.id, self.unvaried_start(), self.unvaried_end())
    }

    // UNVARIED:

    pub fn unvaried_start_date(&self) -> NaiveDate {
        self.unvaried_start_date
    }

    pub fn unvaried_start_time(&self) -> NaiveTime {
        self.unvaried_start_time
    }

    pub fn unvaried_end_date(&self) -> Option<NaiveDate> {
        self.unvaried_end_date
    }

    pub fn unvaried_end_time(&self) -> Option<NaiveTime> {
        self.unvaried_end_time
    }

    pub fn unvaried_start(&self) -> NaiveDateTime {
        self.unvaried_start_date.and_time(self.unvaried_start_time)
    }

    pub fn unvaried_end(&self) -> NaiveDateTime {
        self.unvaried_end_date
            .unwrap_or(self.unvaried_start_date)
            .and_time(self.unvaried_end_time.unwrap_or(self.unvaried_start_time))
    }

    // VARIED (canonical):

    pub fn varied_end_date(&self) -> Option<NaiveDate> {
        self.varied_end_date
    }

    pub fn varied_end_time(&self) -> Option<NaiveTime> {
        self.varied_end_time
    }

    pub fn start_date(&self) -> NaiveDate {
        self.varied_start_date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.varied_start_time
    }

    pub fn end_date(&self) -> NaiveDate {
        self.varied_end_date.unwrap_or(self.varied_start_date)
    }

    pub fn end_time(&self) -> NaiveTime {
        self.varied_end_time.unwrap_or(self.varied_start_time)
    }

    pub fn varied_start(&self) -> NaiveDateTime {
        self.start_date().and_time(self.start_time())
    }

    pub fn varied_end(&self) -> NaiveDateTime {
        self.end_date().and_time(self.end_time())
    }

    pub fn start(&self) -> NaiveDateTime {
        self.varied_start()
    }

    pub fn end(&self) -> NaiveDateTime {
        self.varied_end()
    }

    pub fn set_varied_start(&mut self, start: NaiveDateTime) {
        self.varied_start_date = start.date();
        self.varied_start_time = start.time();
    }

    pub fn set_varied_end(&mut self, end: NaiveDateTime) {
        self.varied_end_date = Some(end.date());
        self.varied_end_time = Some(end.time());
    }

    // EVENTS:

    pub fn unvaried_event(&self) -> &Arc<Event> {
        &self.event
    }

    pub fn varied_event(&self) -> Option<&Arc<EventVariation>> {
        self.variation.get()
    }

    pub fn variation(&self) -> &Variation {
        &self.variation
    }

    /// Link (or unlink, with `None`) a variation to this occurrence.
    ///
    /// Fails with `UnsupportedOperation` when the event does not support
    /// variations, and with `UnknownVariation` when the variation is not one
    /// of the event's. The occurrence is left untouched on failure.
    pub fn set_varied_event(&mut self, variation: Option<Arc<EventVariation>>) -> OccurrenceResult<()> {
        let Variation::Variable(slot) = &mut self.variation else {
            return Err(OccurrenceError::UnsupportedOperation(format!(
                "event '{}' does not support variations",
                self.event.id
            )));
        };

        if let Some(v) = &variation {
            if self.event.variation(&v.id).is_none() {
                return Err(OccurrenceError::UnknownVariation {
                    event: self.event.id.clone(),
                    variation: v.id.clone(),
                });
            }
        }

        *slot = variation;
        Ok(())
    }

    pub fn merged_event(&self) -> MergedEvent<'_> {
        MergedEvent::new(&self.event, self.varied_event().map(Arc::as_ref))
    }

    // STATE:

    pub fn is_moved(&self) -> bool {
        self.unvaried_start() != self.varied_start() || self.unvaried_end() != self.varied_end()
    }

    pub fn is_varied(&self) -> bool {
        self.is_moved() || self.cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn hide_from_lists(&self) -> bool {
        self.hide_from_lists
    }

    pub fn set_hide_from_lists(&mut self, hide: bool) {
        self.hide_from_lists = hide;
    }

    /// Mark cancelled and persist immediately.
    pub fn cancel(&mut self, store: &(impl ExceptionStore + ?Sized)) -> OccurrenceResult<()> {
        self.set_cancelled(true, store)
    }

    /// Clear the cancelled flag and persist immediately.
    pub fn uncancel(&mut self, store: &(impl ExceptionStore + ?Sized)) -> OccurrenceResult<()> {
        self.set_cancelled(false, store)
    }

    fn set_cancelled(
        &mut self,
        cancelled: bool,
        store: &(impl ExceptionStore + ?Sized),
    ) -> OccurrenceResult<()> {
        let previous = self.cancelled;
        self.cancelled = cancelled;

        // In-memory state must match what is stored
        if let Err(e) = self.save(store) {
            self.cancelled = previous;
            return Err(e);
        }

        Ok(())
    }

    /// Persist this occurrence as an exception.
    pub fn save(&self, store: &(impl ExceptionStore + ?Sized)) -> OccurrenceResult<()> {
        store.save(&self.to_record())
    }

    // ORDERING:

    /// Order by varied start, then by varied end.
    ///
    /// This is deliberately not `Ord`: equality is identity (unvaried
    /// timing), while ordering follows the varied timing.
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        self.varied_start()
            .cmp(&other.varied_start())
            .then_with(|| self.varied_end().cmp(&other.varied_end()))
    }

    // DERIVED:

    /// Position of this occurrence within its event's occurrences for the
    /// day containing its start.
    ///
    /// Regenerates that day's list from `generator`. Fails with `Lookup`
    /// when this occurrence is not in it.
    pub fn generated_id<G>(&self, generator: &G) -> OccurrenceResult<usize>
    where
        G: Generator + ?Sized,
    {
        let day = DateRange::day_of(self.start_date());
        let occurrences = generator.get_occurrences(&day)?;

        occurrences
            .iter()
            .position(|o| o == self)
            .ok_or_else(|| OccurrenceError::Lookup {
                event: self.event.id.clone(),
                start: self.varied_start(),
            })
    }

    /// Minimal iCalendar representation: summary plus canonical start and end.
    pub fn as_icalendar(&self) -> icalendar::Calendar {
        crate::ics::export_occurrence(self.merged_event().title(), self.varied_start(), self.varied_end())
    }

    pub fn unvaried_range_string(&self) -> String {
        range_string(self.unvaried_start(), self.unvaried_end())
    }

    pub fn varied_range_string(&self) -> String {
        range_string(self.varied_start(), self.varied_end())
    }

    /// Day and start time, e.g. "Mon, 01 Jan 2024, 09:00"
    pub fn date_description(&self) -> String {
        format!(
            "{}, {}",
            self.varied_start().format(DAY_FORMAT),
            self.varied_start().format("%H:%M")
        )
    }
}

fn range_string(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{}–{}", start.format(DAY_TIME_FORMAT), end.format(DAY_TIME_FORMAT))
}

/// Sort occurrences by varied start, then varied end.
pub fn sort_occurrences(occurrences: &mut [Occurrence]) {
    occurrences.sort_by(Occurrence::cmp_by_time);
}

impl PartialEq for Occurrence {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event
            && self.unvaried_start() == other.unvaried_start()
            && self.unvaried_end() == other.unvaried_end()
    }
}

impl Eq for Occurrence {}

impl Hash for Occurrence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.event.id.hash(state);
        self.unvaried_start().hash(state);
        self.unvaried_end().hash(state);
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.event.title, self.varied_start().format(DAY_FORMAT))
    }
}
