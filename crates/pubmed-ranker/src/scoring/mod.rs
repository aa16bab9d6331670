//! Relevance scoring.
//!
//! Six independent rules, each adding a fixed positive contribution when it
//! triggers. Rules never interact, so the total is simply the sum of the
//! triggered contributions, and reasons are reported in rule order.

use crate::models::{ArticleRecord, ScoreResult, ScoringProfile};

/// Minimum number of authors for the collaboration bonus.
pub const MIN_AUTHORS: usize = 5;

/// A single scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Journal name contains a configured journal.
    HighImpactJournal,
    /// A publication type equals a valued type.
    ValuedPublicationType,
    /// At least [`MIN_AUTHORS`] authors.
    MultipleAuthors,
    /// An affiliation contains a configured institution.
    PrestigiousInstitution,
    /// Title contains a hot keyword.
    HotKeyword,
    /// The record lists research grants.
    ResearchFunding,
}

impl Rule {
    /// All rules in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::HighImpactJournal,
        Self::ValuedPublicationType,
        Self::MultipleAuthors,
        Self::PrestigiousInstitution,
        Self::HotKeyword,
        Self::ResearchFunding,
    ];

    /// Points added when the rule triggers.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::HighImpactJournal => 2,
            Self::ValuedPublicationType => 2,
            Self::MultipleAuthors => 1,
            Self::PrestigiousInstitution => 1,
            Self::HotKeyword => 2,
            Self::ResearchFunding => 2,
        }
    }

    /// Reason reported when the rule triggers.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::HighImpactJournal => "High-impact journal (+2)",
            Self::ValuedPublicationType => "Valued publication type (+2)",
            Self::MultipleAuthors => "Multiple authors (+1)",
            Self::PrestigiousInstitution => "Prestigious institution (+1)",
            Self::HotKeyword => "Hot keyword in title (+2)",
            Self::ResearchFunding => "Has research funding (+2)",
        }
    }

    /// Whether the rule triggers for `record`.
    #[must_use]
    pub fn matches(self, record: &ArticleRecord, profile: &ScoringProfile) -> bool {
        match self {
            Self::HighImpactJournal => contains_any(&record.journal, &profile.journals),
            Self::ValuedPublicationType => record
                .publication_types
                .iter()
                .any(|pt| profile.valued_publication_types.iter().any(|v| v == pt)),
            Self::MultipleAuthors => record.author_count >= MIN_AUTHORS,
            Self::PrestigiousInstitution => record
                .affiliations
                .iter()
                .any(|aff| contains_any(aff, &profile.institutions)),
            Self::HotKeyword => contains_any(&record.title, &profile.hot_keywords),
            Self::ResearchFunding => record.has_funding,
        }
    }
}

/// Score `record` against `profile`.
#[must_use]
pub fn score(record: &ArticleRecord, profile: &ScoringProfile) -> ScoreResult {
    Rule::ALL.iter().filter(|rule| rule.matches(record, profile)).fold(
        ScoreResult::default(),
        |mut acc, rule| {
            acc.score += rule.weight();
            acc.reasons.push(rule.reason());
            acc
        },
    )
}

/// Maximum score the rule set can award.
#[must_use]
pub fn max_score() -> u32 {
    Rule::ALL.iter().map(|rule| rule.weight()).sum()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}
