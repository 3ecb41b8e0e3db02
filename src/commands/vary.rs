use anyhow::{Context, Result};
use occur_core::catalog::CatalogEntry;
use owo_colors::OwoColorize;

use crate::find_occurrence;

/// Link an occurrence to a variation, or unlink it with `None`.
pub fn run(entry: &CatalogEntry, at: &str, variation: Option<&str>) -> Result<()> {
    let (generator, mut occ) = find_occurrence(entry, at)?;

    let variation = match variation {
        Some(id) => {
            let found = entry.event.variation(id).cloned().with_context(|| {
                let known: Vec<&str> = entry.event.variations.iter().map(|v| v.id.as_str()).collect();
                if known.is_empty() {
                    format!("'{}' defines no variations", entry.slug)
                } else {
                    format!(
                        "'{}' has no variation '{}'. Available: {}",
                        entry.slug,
                        id,
                        known.join(", ")
                    )
                }
            })?;
            Some(found)
        }
        None => None,
    };

    occ.set_varied_event(variation)?;
    occ.save(generator.store())?;

    match occ.varied_event() {
        Some(v) => println!("{} {} {}", "Linked".green(), occ, format!("({})", v.reason).dimmed()),
        None => println!("{} {}", "Unlinked".green(), occ),
    }

    Ok(())
}
