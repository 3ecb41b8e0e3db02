use anyhow::Result;
use occur_core::catalog::CatalogEntry;
use owo_colors::OwoColorize;

use crate::find_occurrence;

/// Cancel (or with `cancel == false`, restore) one occurrence.
pub fn run(entry: &CatalogEntry, at: &str, cancel: bool) -> Result<()> {
    let (generator, mut occ) = find_occurrence(entry, at)?;

    if occ.is_cancelled() == cancel {
        let state = if cancel { "already cancelled" } else { "not cancelled" };
        println!("{} {}", occ, format!("({})", state).dimmed());
        return Ok(());
    }

    if cancel {
        occ.cancel(generator.store())?;
        println!("{} {}", "Cancelled".red(), occ);
    } else {
        occ.uncancel(generator.store())?;
        println!("{} {}", "Restored".green(), occ);
    }

    Ok(())
}
