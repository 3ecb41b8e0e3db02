use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use occur_core::catalog::CatalogEntry;
use occur_core::date_range::DateRange;
use occur_core::generator::{Generator, visible};
use occur_core::occurrence::Occurrence;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::render::Render;

/// JSON shape of one listed occurrence.
#[derive(Serialize)]
struct ListedOccurrence {
    event: String,
    id: Option<usize>,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    original_start: NaiveDateTime,
    original_end: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    variation: Option<String>,
    cancelled: bool,
    hidden: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    reason: String,
}

impl ListedOccurrence {
    fn new(slug: &str, id: Option<usize>, occ: &Occurrence) -> Self {
        Self {
            event: slug.to_string(),
            id,
            title: occ.merged_event().title().to_string(),
            start: occ.start(),
            end: occ.end(),
            original_start: occ.unvaried_start(),
            original_end: occ.unvaried_end(),
            variation: occ.varied_event().map(|v| v.id.clone()),
            cancelled: occ.is_cancelled(),
            hidden: occ.hide_from_lists(),
            reason: occ.reason(),
        }
    }
}

pub fn run(entries: Vec<CatalogEntry>, range: DateRange, all: bool, json: bool) -> Result<()> {
    let mut listed: Vec<(String, Option<usize>, Occurrence)> = Vec::new();

    for entry in &entries {
        let generator = entry.generator();
        let mut occurrences = generator.get_occurrences(&range)?;
        let generated = occurrences.len();
        if !all {
            occurrences = visible(occurrences);
        }
        tracing::debug!(
            event = %entry.slug,
            generated,
            hidden = generated - occurrences.len(),
            "Listing occurrences"
        );

        for occ in occurrences {
            // Positions are only meaningful within one event's day
            let id = occ.generated_id(&generator).ok();
            listed.push((entry.slug.clone(), id, occ));
        }
    }

    listed.sort_by(|a, b| a.2.cmp_by_time(&b.2));

    if json {
        let view: Vec<ListedOccurrence> = listed
            .iter()
            .map(|(slug, id, occ)| ListedOccurrence::new(slug, *id, occ))
            .collect();
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if listed.is_empty() {
        println!("{}", "No occurrences found".dimmed());
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let mut current_date: Option<NaiveDate> = None;

    for (slug, id, occ) in &listed {
        let date = occ.start_date();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        let tag = match id {
            Some(n) => format!("[{}#{}]", slug, n),
            None => format!("[{}]", slug),
        };
        println!("  {} {}", occ.render(), tag.dimmed());
    }

    Ok(())
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_label() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();

        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(today.succ_opt().unwrap(), today), "Tomorrow");
        assert_eq!(format_date_label(today.pred_opt().unwrap(), today), "Yesterday");
        assert_eq!(
            format_date_label(NaiveDate::from_ymd_opt(2025, 2, 26).unwrap(), today),
            "Wed Feb 26"
        );
    }
}
