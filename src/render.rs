//! TUI rendering for occur-core types.
//!
//! Extension traits that add colored terminal rendering using owo_colors.

use occur_core::occurrence::Occurrence;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Occurrence {
    /// One list line: time range, title, then state markers and reason.
    fn render(&self) -> String {
        let time = format!(
            "{:>5}–{}",
            self.start().format("%H:%M"),
            self.end().format("%H:%M")
        );
        let title = self.merged_event().title();

        let line = if self.is_cancelled() {
            format!("{} {}", time.dimmed(), title.strikethrough().dimmed())
        } else if self.is_moved() {
            format!("{} {}", time.yellow(), title)
        } else {
            format!("{} {}", time, title)
        };

        let mut markers = Vec::new();
        if self.hide_from_lists() {
            markers.push("hidden".to_string());
        }
        let reason = self.reason();
        if !reason.is_empty() {
            markers.push(reason);
        }

        if markers.is_empty() {
            line
        } else {
            format!("{} {}", line, format!("({})", markers.join("; ")).dimmed())
        }
    }
}
