use anyhow::Result;
use occur_core::catalog::CatalogEntry;
use owo_colors::OwoColorize;

use crate::find_occurrence;

pub fn run(entry: &CatalogEntry, at: &str, hide: bool) -> Result<()> {
    let (generator, mut occ) = find_occurrence(entry, at)?;

    occ.set_hide_from_lists(hide);
    occ.save(generator.store())?;

    if hide {
        println!("{} {}", "Hidden".dimmed(), occ);
    } else {
        println!("{} {}", "Shown".green(), occ);
    }

    Ok(())
}
