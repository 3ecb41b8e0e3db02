//! Event catalog on disk.
//!
//! Layout under the data directory:
//! ```text
//! <data_dir>/
//!   standup/
//!     event.toml
//!     exceptions/
//!       20240103T090000__20240103T093000.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::EVENT_FILE;
use crate::error::{OccurrenceError, OccurrenceResult};
use crate::event::{Event, EventKind, EventVariation};
use crate::occur_config::OccurConfig;
use crate::recurrence::{RecurrenceRule, RuleGenerator};
use crate::store::FileStore;

fn default_duration() -> String {
    "1h".to_string()
}

/// Contents of an event.toml file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub kind: EventKind,
    pub recurrence: RecurrenceDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<EventVariation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDefinition {
    pub start: NaiveDateTime,
    /// Human-readable duration, e.g. "30m" or "1h 30m"
    #[serde(default = "default_duration")]
    pub duration: String,
    pub rrule: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exdates: Vec<NaiveDateTime>,
}

impl EventDefinition {
    /// Split into the event entity (with id `slug`) and its recurrence rule.
    pub fn to_parts(&self, slug: &str) -> OccurrenceResult<(Event, RecurrenceRule)> {
        let duration = humantime::parse_duration(&self.recurrence.duration)
            .map_err(|e| {
                OccurrenceError::Config(format!(
                    "Invalid duration '{}' for event '{}': {}",
                    self.recurrence.duration, slug, e
                ))
            })
            .and_then(|d| {
                Duration::from_std(d)
                    .map_err(|e| OccurrenceError::Config(format!("Duration out of range: {e}")))
            })?;

        let rule = RecurrenceRule {
            start: self.recurrence.start,
            duration,
            rrule: self.recurrence.rrule.clone(),
            exdates: self.recurrence.exdates.clone(),
        };
        rule.validate()?;

        let event = Event {
            id: slug.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            kind: self.kind,
            variations: self.variations.iter().cloned().map(Arc::new).collect(),
        };

        Ok((event, rule))
    }
}

/// One event loaded from the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub slug: String,
    pub event: Arc<Event>,
    pub rule: RecurrenceRule,
    root: PathBuf,
}

impl CatalogEntry {
    /// Generator for this event, reading and writing exceptions in the catalog.
    pub fn generator(&self) -> RuleGenerator<FileStore> {
        RuleGenerator::new(self.event.clone(), self.rule.clone(), FileStore::new(&self.root))
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(&self.slug)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    default_event: Option<String>,
}

impl Catalog {
    /// Open the catalog named by the global config.
    pub fn load() -> OccurrenceResult<Self> {
        let config = OccurConfig::load()?;

        Ok(Catalog {
            root: config.data_path(),
            default_event: config.default_event,
        })
    }

    pub fn open(root: impl Into<PathBuf>) -> Self {
        Catalog {
            root: root.into(),
            default_event: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Slugs of all event directories, sorted.
    pub fn slugs(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut slugs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && path.join(EVENT_FILE).exists())
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();

        slugs.sort();
        slugs
    }

    pub fn entry(&self, slug: &str) -> OccurrenceResult<CatalogEntry> {
        let path = self.root.join(slug).join(EVENT_FILE);

        if !path.exists() {
            return Err(OccurrenceError::EventNotFound(slug.to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        let definition: EventDefinition = toml::from_str(&content).map_err(|e| {
            OccurrenceError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        let (event, rule) = definition.to_parts(slug)?;

        Ok(CatalogEntry {
            slug: slug.to_string(),
            event: Arc::new(event),
            rule,
            root: self.root.clone(),
        })
    }

    /// All loadable events. Broken definitions are skipped with a warning.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.slugs()
            .iter()
            .filter_map(|slug| match self.entry(slug) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Skipping event definition");
                    None
                }
            })
            .collect()
    }

    /// Use `slug` when a command names no event.
    pub fn with_default_event(mut self, slug: impl Into<String>) -> Self {
        self.default_event = Some(slug.into());
        self
    }

    /// The configured default event, if any. A default that names a missing
    /// or broken event is an error rather than silently ignored.
    pub fn default_entry(&self) -> OccurrenceResult<Option<CatalogEntry>> {
        match &self.default_event {
            Some(slug) => self.entry(slug).map(Some),
            None => Ok(None),
        }
    }

    /// Generate a slug for `title` that doesn't conflict with an existing event directory.
    /// If the base slug exists, tries slug-2, slug-3, etc.
    pub fn unique_slug_for(&self, title: &str) -> OccurrenceResult<String> {
        let base = match slug::slugify(title) {
            s if s.is_empty() => "event".to_string(),
            s => s,
        };

        if !self.root.join(&base).exists() {
            return Ok(base);
        }

        for n in 2..=100 {
            let suffixed = format!("{}-{}", base, n);
            if !self.root.join(&suffixed).exists() {
                return Ok(suffixed);
            }
        }

        Err(OccurrenceError::Config(format!(
            "Too many event name collisions for '{}'",
            base
        )))
    }

    /// Write a new event definition and return it loaded.
    #[tracing::instrument(skip(self, definition), fields(title = %definition.title))]
    pub fn create(&self, definition: &EventDefinition) -> OccurrenceResult<CatalogEntry> {
        let slug = self.unique_slug_for(&definition.title)?;

        // Reject bad durations and rules before anything is written
        definition.to_parts(&slug)?;

        let dir = self.root.join(&slug);
        std::fs::create_dir_all(&dir)?;

        let content = toml::to_string_pretty(definition)
            .map_err(|e| OccurrenceError::Serialization(e.to_string()))?;
        std::fs::write(dir.join(EVENT_FILE), content)?;

        tracing::info!(slug = %slug, "Created event");
        self.entry(&slug)
    }
}
