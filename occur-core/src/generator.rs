//! The generator contract: one per event, lists its occurrences for a range.

use std::sync::Arc;

use crate::date_range::DateRange;
use crate::error::OccurrenceResult;
use crate::event::Event;
use crate::occurrence::Occurrence;

/// Expands an event into occurrences.
pub trait Generator {
    /// The event whose occurrences this generator produces.
    fn event(&self) -> &Arc<Event>;

    /// Occurrences overlapping the half-open `range`, sorted by
    /// `Occurrence::cmp_by_time`, with persisted exceptions substituted for
    /// the computed instances sharing their identity key.
    fn get_occurrences(&self, range: &DateRange) -> OccurrenceResult<Vec<Occurrence>>;
}

/// Drop occurrences flagged `hide_from_lists`.
pub fn visible(occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    occurrences
        .into_iter()
        .filter(|o| !o.hide_from_lists())
        .collect()
}
