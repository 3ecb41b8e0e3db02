//! Event and event-variation entities.
//!
//! An `Event` is the definition an occurrence generator expands. An
//! `EventVariation` is an alternate set of details that can be linked to a
//! single occurrence, overriding the event's title, description or location
//! for that instance only.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Whether occurrences of an event can be linked to an `EventVariation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Fixed,
    Variable,
}

/// A recurring event definition.
#[derive(Debug, Clone)]
pub struct Event {
    /// Stable identifier (the catalog slug).
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub kind: EventKind,
    pub variations: Vec<Arc<EventVariation>>,
}

/// Alternate details for one occurrence of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventVariation {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Shown verbatim as the occurrence's reason.
    pub reason: String,
}

impl Event {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: EventKind) -> Self {
        Event {
            id: id.into(),
            title: title.into(),
            description: None,
            location: None,
            kind,
            variations: Vec::new(),
        }
    }

    pub fn supports_variations(&self) -> bool {
        self.kind == EventKind::Variable
    }

    pub fn variation(&self, id: &str) -> Option<&Arc<EventVariation>> {
        self.variations.iter().find(|v| v.id == id)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Read-only view of an event overlaid by an optional variation.
///
/// Variation fields take precedence wherever the variation supplies a value.
#[derive(Debug, Clone, Copy)]
pub struct MergedEvent<'a> {
    event: &'a Event,
    variation: Option<&'a EventVariation>,
}

impl<'a> MergedEvent<'a> {
    pub fn new(event: &'a Event, variation: Option<&'a EventVariation>) -> Self {
        MergedEvent { event, variation }
    }

    pub fn title(&self) -> &'a str {
        self.variation
            .and_then(|v| v.title.as_deref())
            .unwrap_or(&self.event.title)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.variation
            .and_then(|v| v.description.as_deref())
            .or(self.event.description.as_deref())
    }

    pub fn location(&self) -> Option<&'a str> {
        self.variation
            .and_then(|v| v.location.as_deref())
            .or(self.event.location.as_deref())
    }

    pub fn event(&self) -> &'a Event {
        self.event
    }

    pub fn variation(&self) -> Option<&'a EventVariation> {
        self.variation
    }
}
