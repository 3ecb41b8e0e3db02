//! Minimal iCalendar export of occurrences (RFC 5545).

mod generate;
mod parse;

pub use generate::{export_occurrence, to_ics_string};
pub use parse::{ExportedOccurrence, parse_exported};
