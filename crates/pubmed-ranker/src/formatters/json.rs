//! JSON output.

use serde_json::{Value, json};

use crate::models::{RankReport, RankedEntry};

/// Compact representation of one ranked entry.
#[must_use]
pub fn compact_entry(entry: &RankedEntry) -> Value {
    let article = &entry.article;
    json!({
        "pmid": article.id,
        "title": article.display_title,
        "link": article.link(),
        "journal": article.display_journal,
        "date": article.date,
        "score": entry.score(),
        "why": entry.result.reasons,
    })
}

/// Full report: entries in rank order plus run bookkeeping.
#[must_use]
pub fn format_report_json(report: &RankReport) -> Value {
    json!({
        "query": report.query,
        "generatedAt": report.generated_at.to_rfc3339(),
        "requested": report.requested,
        "ranked": report.entries.len(),
        "completed": report.completed,
        "entries": report.entries.iter().map(compact_entry).collect::<Vec<_>>(),
        "skipped": report
            .skipped
            .iter()
            .map(|s| json!({"pmid": s.id, "reason": s.reason.to_string()}))
            .collect::<Vec<_>>(),
    })
}
