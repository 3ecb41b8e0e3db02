use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Occurrence, OccurrenceKey};
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::event::Event;

/// Persisted form of an exceptional occurrence.
///
/// Every time field is optional so that incomplete rows are caught when they
/// are turned back into an `Occurrence` rather than when they are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    pub event_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unvaried_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unvaried_start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unvaried_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unvaried_end_time: Option<NaiveTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varied_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varied_start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varied_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varied_end_time: Option<NaiveTime>,

    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub hide_from_lists: bool,

    /// Id of the linked `EventVariation`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

impl OccurrenceRecord {
    /// Identity key of the stored occurrence.
    pub fn key(&self) -> OccurrenceResult<OccurrenceKey> {
        let (Some(start_date), Some(start_time)) = (self.unvaried_start_date, self.unvaried_start_time)
        else {
            return Err(OccurrenceError::Malformed(format!(
                "stored occurrence of '{}' has no unvaried start",
                self.event_id
            )));
        };

        Ok(OccurrenceKey {
            event_id: self.event_id.clone(),
            start_date,
            start_time,
            end_date: self.unvaried_end_date.unwrap_or(start_date),
            end_time: self.unvaried_end_time.unwrap_or(start_time),
        })
    }
}

impl Occurrence {
    pub fn to_record(&self) -> OccurrenceRecord {
        OccurrenceRecord {
            event_id: self.event.id.clone(),
            unvaried_start_date: Some(self.unvaried_start_date),
            unvaried_start_time: Some(self.unvaried_start_time),
            unvaried_end_date: self.unvaried_end_date,
            unvaried_end_time: self.unvaried_end_time,
            varied_start_date: Some(self.varied_start_date),
            varied_start_time: Some(self.varied_start_time),
            varied_end_date: self.varied_end_date,
            varied_end_time: self.varied_end_time,
            cancelled: self.cancelled,
            hide_from_lists: self.hide_from_lists,
            variation: self.varied_event().map(|v| v.id.clone()),
        }
    }

    /// Rebuild a stored occurrence for `event`.
    ///
    /// Fails when the record belongs to another event, lacks an unvaried
    /// start, or links a variation the event does not have (or cannot have).
    pub fn from_record(event: Arc<Event>, record: &OccurrenceRecord) -> OccurrenceResult<Self> {
        if record.event_id != event.id {
            return Err(OccurrenceError::Malformed(format!(
                "stored occurrence belongs to '{}', not '{}'",
                record.event_id, event.id
            )));
        }

        let variation = match &record.variation {
            Some(id) if !event.supports_variations() => {
                return Err(OccurrenceError::UnsupportedOperation(format!(
                    "stored occurrence links variation '{}' but event '{}' does not support variations",
                    id, event.id
                )));
            }
            Some(id) => Some(event.variation(id).cloned().ok_or_else(|| {
                OccurrenceError::UnknownVariation {
                    event: event.id.clone(),
                    variation: id.clone(),
                }
            })?),
            None => None,
        };

        let mut builder = Occurrence::builder(event)
            .cancelled(record.cancelled)
            .hide_from_lists(record.hide_from_lists);

        builder.unvaried_start_date = record.unvaried_start_date;
        builder.unvaried_start_time = record.unvaried_start_time;
        builder.unvaried_end_date = record.unvaried_end_date;
        builder.unvaried_end_time = record.unvaried_end_time;
        builder.varied_start_date = record.varied_start_date;
        builder.varied_start_time = record.varied_start_time;
        builder.varied_end_date = record.varied_end_date;
        builder.varied_end_time = record.varied_end_time;
        builder.varied_event = variation;

        builder.build()
    }
}
