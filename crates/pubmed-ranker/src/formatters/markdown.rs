//! Markdown table output.

use crate::models::{RankReport, RankedEntry};

/// Longest title shown in the table before it is cut.
const MAX_TITLE_CHARS: usize = 120;

/// Format a report as a Markdown table preceded by its summary line.
#[must_use]
pub fn format_report_markdown(report: &RankReport) -> String {
    let mut output = format!("{}\n\n", report.summary());

    if report.is_empty() {
        return output;
    }

    output.push_str(&format_entries_table(&report.entries));
    output
}

/// Format entries as a Markdown table: Title, Journal, Date, Score, Why.
#[must_use]
pub fn format_entries_table(entries: &[RankedEntry]) -> String {
    let mut output = String::from("| # | Title | Journal | Date | Score | Why |\n");
    output.push_str("|---|---|---|---|---|---|\n");

    for (i, entry) in entries.iter().enumerate() {
        let article = &entry.article;
        output.push_str(&format!(
            "| {} | [{}]({}) | {} | {} | {} | {} |\n",
            i + 1,
            cell(&truncate(&article.display_title, MAX_TITLE_CHARS)),
            article.link(),
            cell(&article.display_journal),
            cell(&article.date),
            entry.score(),
            cell(&entry.result.why()),
        ));
    }

    output
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        text.to_string()
    }
}

/// Keep a value on one table row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
