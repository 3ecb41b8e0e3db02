use anyhow::Result;
use occur_core::EventKind;
use occur_core::catalog::{Catalog, EventDefinition, RecurrenceDefinition};
use occur_core::constants::EVENT_FILE;
use owo_colors::OwoColorize;

use crate::parse_datetime;

pub fn run(
    catalog: &Catalog,
    title: String,
    start: &str,
    rrule: String,
    duration: String,
    location: Option<String>,
    variable: bool,
) -> Result<()> {
    let start = parse_datetime(start)?;

    let definition = EventDefinition {
        title,
        description: None,
        location,
        kind: if variable { EventKind::Variable } else { EventKind::Fixed },
        recurrence: RecurrenceDefinition {
            start,
            duration,
            rrule,
            exdates: Vec::new(),
        },
        variations: Vec::new(),
    };

    let entry = catalog.create(&definition)?;

    println!("{} {}", "Created".green(), entry.event.title.bold());
    println!("  {}", entry.path().join(EVENT_FILE).display().dimmed());

    Ok(())
}
