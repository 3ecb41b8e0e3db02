use anyhow::Result;
use occur_core::catalog::CatalogEntry;
use occur_core::ics::to_ics_string;

use crate::find_occurrence;

pub fn run(entry: &CatalogEntry, at: &str) -> Result<()> {
    let (_, occ) = find_occurrence(entry, at)?;
    print!("{}", to_ics_string(&occ.as_icalendar()));
    Ok(())
}
