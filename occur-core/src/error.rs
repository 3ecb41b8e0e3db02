//! Error types for the occurrence model.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that can occur while building, persisting or looking up occurrences.
#[derive(Error, Debug)]
pub enum OccurrenceError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Occurrence of '{event}' starting {start} is not in its generator's list for that day")]
    Lookup { event: String, start: NaiveDateTime },

    #[error("Malformed occurrence: {0}")]
    Malformed(String),

    #[error("Event '{event}' has no variation '{variation}'")]
    UnknownVariation { event: String, variation: String },

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for occurrence operations.
pub type OccurrenceResult<T> = Result<T, OccurrenceError>;
