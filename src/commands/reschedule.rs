use anyhow::Result;
use occur_core::catalog::CatalogEntry;
use owo_colors::OwoColorize;

use crate::{find_occurrence, parse_datetime};

/// Move one occurrence. Without `end`, the current duration is kept.
pub fn run(entry: &CatalogEntry, at: &str, start: &str, end: Option<&str>) -> Result<()> {
    let (generator, mut occ) = find_occurrence(entry, at)?;

    let start = parse_datetime(start)?;
    let end = match end {
        Some(end) => parse_datetime(end)?,
        None => start + (occ.end() - occ.start()),
    };

    if end < start {
        anyhow::bail!(
            "End {} is before start {}",
            end.format("%Y-%m-%d %H:%M"),
            start.format("%Y-%m-%d %H:%M")
        );
    }

    occ.set_varied_start(start);
    occ.set_varied_end(end);
    occ.save(generator.store())?;

    println!("{} {}", "Moved".yellow(), occ.merged_event().title());
    println!("  {} {}", "from".dimmed(), occ.unvaried_range_string());
    println!("  {}   {}", "to".dimmed(), occ.varied_range_string());

    let reason = occ.reason();
    if !reason.is_empty() {
        println!("  {}", format!("({})", reason).dimmed());
    }

    Ok(())
}
