mod commands;
mod render;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use occur_core::catalog::{Catalog, CatalogEntry};
use occur_core::date_range::DateRange;
use occur_core::occurrence::Occurrence;
use occur_core::recurrence::RuleGenerator;
use occur_core::store::FileStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "occur")]
#[command(about = "List the occurrences of recurring events and override individual instances")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List occurrences in a date range
    List {
        /// Only list this event (by slug)
        #[arg(short, long)]
        event: Option<String>,

        /// First day to list (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Last day to list (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Include occurrences hidden from lists
        #[arg(long)]
        all: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one occurrence in detail
    Show {
        event: String,
        /// Original start of the occurrence (e.g. "2025-03-20T15:00")
        at: String,
    },
    /// Cancel an occurrence
    Cancel { event: String, at: String },
    /// Undo a cancellation
    Uncancel { event: String, at: String },
    /// Hide an occurrence from lists without cancelling it
    Hide {
        event: String,
        at: String,
        /// Show it in lists again
        #[arg(long)]
        undo: bool,
    },
    /// Move an occurrence to a new time
    Move {
        event: String,
        at: String,

        /// New start (e.g. "2025-03-21T16:00")
        #[arg(short, long)]
        start: String,

        /// New end; keeps the original duration if omitted
        #[arg(short = 'e', long)]
        end: Option<String>,
    },
    /// Link an occurrence to one of its event's variations
    Vary {
        event: String,
        at: String,

        /// Variation id from the event definition
        #[arg(required_unless_present = "clear")]
        variation: Option<String>,

        /// Unlink the current variation
        #[arg(long, conflicts_with = "variation")]
        clear: bool,
    },
    /// Print an occurrence as iCalendar
    Export { event: String, at: String },
    /// Define a new recurring event
    New {
        title: String,

        /// First occurrence (e.g. "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// RRULE value, e.g. "FREQ=WEEKLY;BYDAY=MO"
        #[arg(short, long)]
        rrule: String,

        /// Length of each occurrence, e.g. "30m" or "1h 30m"
        #[arg(short, long, default_value = "1h")]
        duration: String,

        #[arg(short, long)]
        location: Option<String>,

        /// Allow occurrences to be linked to variations
        #[arg(long)]
        variable: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::load()?;

    match cli.command {
        Commands::List {
            event,
            from,
            to,
            all,
            json,
        } => {
            let entries = resolve_entries(&catalog, event.as_deref())?;
            let today = chrono::Local::now().date_naive();
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), today)
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::list::run(entries, range, all, json)
        }
        Commands::Show { event, at } => commands::show::run(&catalog.entry(&event)?, &at),
        Commands::Cancel { event, at } => commands::cancel::run(&catalog.entry(&event)?, &at, true),
        Commands::Uncancel { event, at } => {
            commands::cancel::run(&catalog.entry(&event)?, &at, false)
        }
        Commands::Hide { event, at, undo } => commands::hide::run(&catalog.entry(&event)?, &at, !undo),
        Commands::Move {
            event,
            at,
            start,
            end,
        } => commands::reschedule::run(&catalog.entry(&event)?, &at, &start, end.as_deref()),
        Commands::Vary {
            event,
            at,
            variation,
            clear,
        } => {
            let variation = if clear { None } else { variation };
            commands::vary::run(&catalog.entry(&event)?, &at, variation.as_deref())
        }
        Commands::Export { event, at } => commands::export::run(&catalog.entry(&event)?, &at),
        Commands::New {
            title,
            start,
            rrule,
            duration,
            location,
            variable,
        } => commands::new::run(&catalog, title, &start, rrule, duration, location, variable),
    }
}

fn resolve_entries(catalog: &Catalog, event_filter: Option<&str>) -> Result<Vec<CatalogEntry>> {
    match event_filter {
        Some(slug) => Ok(vec![catalog.entry(slug)?]),
        None => {
            if let Some(entry) = catalog.default_entry()? {
                return Ok(vec![entry]);
            }

            let entries = catalog.entries();
            if entries.is_empty() {
                anyhow::bail!(
                    "No events found in {}.\n\n\
                    Define your first event with:\n  \
                    occur new <title> --start <when> --rrule <rule>\n\n\
                    Example:\n  \
                    occur new \"Standup\" --start 2025-03-20T09:00 --rrule FREQ=DAILY --duration 15m",
                    catalog.root().display()
                );
            }
            Ok(entries)
        }
    }
}

/// Parse "YYYY-MM-DDTHH:MM" (or with a space, or with seconds).
fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .with_context(|| format!("Invalid date/time '{}'. Expected YYYY-MM-DDTHH:MM", s))
}

/// Find the occurrence of `entry` whose original start is `at`.
fn find_occurrence(entry: &CatalogEntry, at: &str) -> Result<(RuleGenerator<FileStore>, Occurrence)> {
    let at = parse_datetime(at)?;
    let generator = entry.generator();
    tracing::debug!(event = %entry.slug, at = %at, "Looking up occurrence");

    let occurrence = generator.occurrence_at(at)?.with_context(|| {
        format!(
            "'{}' has no occurrence starting at {}",
            entry.slug,
            at.format("%Y-%m-%d %H:%M")
        )
    })?;

    tracing::debug!(
        event = %entry.slug,
        moved = occurrence.is_moved(),
        cancelled = occurrence.is_cancelled(),
        "Found occurrence"
    );
    Ok((generator, occurrence))
}
