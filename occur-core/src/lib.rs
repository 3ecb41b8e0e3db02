//! Occurrence model for recurring events.
//!
//! - `occurrence`: one instance of an event, with unvaried and varied timing
//! - `generator` / `recurrence`: expanding an event into occurrences for a range
//! - `store`: persistence of exceptional occurrences
//! - `catalog`: event definitions on disk
//! - `ics`: minimal iCalendar export

pub mod catalog;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod generator;
pub mod ics;
pub mod occur_config;
pub mod occurrence;
pub mod recurrence;
pub mod store;

pub use error::{OccurrenceError, OccurrenceResult};
pub use event::{Event, EventKind, EventVariation, MergedEvent};
pub use generator::Generator;
pub use occurrence::{Occurrence, OccurrenceKey, ReasonClause};
