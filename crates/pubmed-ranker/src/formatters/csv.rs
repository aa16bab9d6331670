//! CSV export of ranked entries.

use crate::models::RankedEntry;

/// Header row of the export.
pub const CSV_HEADER: [&str; 6] = ["Title", "Link", "Journal", "Date", "Score", "Why"];

/// Format entries as CSV, one row per entry in the given order.
///
/// Quoting follows RFC 4180 and never alters field content.
#[must_use]
pub fn format_csv(entries: &[RankedEntry]) -> String {
    let mut output = CSV_HEADER.join(",");
    output.push('\n');

    for entry in entries {
        let row = [
            csv_escape(&entry.article.display_title),
            csv_escape(&entry.article.link()),
            csv_escape(&entry.article.display_journal),
            csv_escape(&entry.article.date),
            entry.score().to_string(),
            csv_escape(&entry.result.why()),
        ];
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Escape a string for CSV output.
fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
