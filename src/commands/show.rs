use anyhow::Result;
use occur_core::catalog::CatalogEntry;
use owo_colors::OwoColorize;

use crate::find_occurrence;

pub fn run(entry: &CatalogEntry, at: &str) -> Result<()> {
    let (generator, occ) = find_occurrence(entry, at)?;
    let merged = occ.merged_event();

    println!("{}", merged.title().bold());
    println!("  {} {}", "When:".dimmed(), occ.varied_range_string());
    if occ.is_varied() {
        println!("  {} {}", "Originally:".dimmed(), occ.unvaried_range_string());
    }
    if let Some(location) = merged.location() {
        println!("  {} {}", "Where:".dimmed(), location);
    }
    if let Some(description) = merged.description() {
        println!("  {} {}", "About:".dimmed(), description);
    }
    if let Some(variation) = occ.varied_event() {
        println!("  {} {}", "Variation:".dimmed(), variation.id);
    }

    let mut state = Vec::new();
    if occ.is_cancelled() {
        state.push("cancelled".red().to_string());
    }
    if occ.is_moved() {
        state.push("moved".yellow().to_string());
    }
    if occ.hide_from_lists() {
        state.push("hidden".dimmed().to_string());
    }
    if !state.is_empty() {
        println!("  {} {}", "State:".dimmed(), state.join(", "));
    }

    let reason = occ.reason();
    if !reason.is_empty() {
        println!("  {} {}", "Reason:".dimmed(), reason);
    }

    let id = occ.generated_id(&generator)?;
    println!("  {} {}#{}", "Id:".dimmed(), entry.slug, id);

    Ok(())
}
