//! Scores, ranked entries and the final report.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ArticleId, ArticleRecord};
use crate::error::SkipReason;

/// Score and justification for one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    /// Sum of the contributions of every triggered rule.
    pub score: u32,

    /// One reason per triggered rule, in rule order.
    pub reasons: Vec<&'static str>,
}

impl ScoreResult {
    /// Reasons joined for the `Why` column.
    #[must_use]
    pub fn why(&self) -> String {
        self.reasons.join("; ")
    }
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// Position of the identifier in the search results (0-based).
    pub position: usize,

    /// Extracted article metadata.
    pub article: ArticleRecord,

    /// Score and reasons.
    pub result: ScoreResult,
}

impl RankedEntry {
    /// Score of this entry.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.result.score
    }

    /// Report order: higher score first, then search order.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other.score().cmp(&self.score()).then(self.position.cmp(&other.position))
    }
}

/// An identifier that was dropped from the report, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedArticle {
    /// Position of the identifier in the search results (0-based).
    pub position: usize,

    /// The identifier that failed.
    pub id: ArticleId,

    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub reason: SkipReason,
}

/// Outcome of one ranking run.
#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    /// The query that produced this report.
    pub query: String,

    /// Entries sorted by score descending, ties in search order.
    pub entries: Vec<RankedEntry>,

    /// Number of identifiers the search returned.
    pub requested: usize,

    /// Identifiers whose fetch failed.
    pub skipped: Vec<SkippedArticle>,

    /// False when the run was cancelled or hit its deadline.
    pub completed: bool,

    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
}

impl RankReport {
    /// Assemble a report, sorting the entries into report order.
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        mut entries: Vec<RankedEntry>,
        requested: usize,
        mut skipped: Vec<SkippedArticle>,
        completed: bool,
    ) -> Self {
        entries.sort_by(RankedEntry::rank_cmp);
        skipped.sort_by_key(|s| s.position);
        Self { query: query.into(), entries, requested, skipped, completed, generated_at: Utc::now() }
    }

    /// Number of ranked articles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no article made it into the report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line summary for the terminal.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!("Found {} articles.", self.entries.len());
        if !self.skipped.is_empty() {
            line.push_str(&format!(" ({} could not be retrieved)", self.skipped.len()));
        }
        if !self.completed {
            line.push_str(" Run stopped early; results are partial.");
        }
        line
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}
