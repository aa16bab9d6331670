//! Per-run search and scoring inputs.

use serde::{Deserialize, Serialize};

use crate::config::{api, defaults};

/// Lists the scorer matches against. All entries are stored trimmed and
/// lower-cased; blank entries are dropped so they can never match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringProfile {
    /// High-impact journal names, matched as substrings of the journal.
    pub journals: Vec<String>,

    /// Institution names, matched as substrings of each affiliation.
    pub institutions: Vec<String>,

    /// Keywords matched as substrings of the title.
    pub hot_keywords: Vec<String>,

    /// Publication types matched by exact equality.
    pub valued_publication_types: Vec<String>,
}

impl ScoringProfile {
    /// Profile with the given journals and institutions and the built-in
    /// keyword and publication type lists.
    #[must_use]
    pub fn new<J, I, S, T>(journals: J, institutions: I) -> Self
    where
        J: IntoIterator<Item = S>,
        I: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            journals: normalize(journals),
            institutions: normalize(institutions),
            hot_keywords: normalize(defaults::HOT_KEYWORDS.iter()),
            valued_publication_types: normalize(defaults::VALUED_PUBLICATION_TYPES.iter()),
        }
    }

    /// Profile built from newline-separated journal and institution text.
    #[must_use]
    pub fn from_lines(journals: &str, institutions: &str) -> Self {
        Self::new(journals.lines(), institutions.lines())
    }

    /// Replace the hot keyword list.
    #[must_use]
    pub fn with_hot_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hot_keywords = normalize(keywords);
        self
    }

    /// Replace the valued publication type list.
    #[must_use]
    pub fn with_valued_publication_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.valued_publication_types = normalize(types);
        self
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::from_lines(defaults::JOURNALS, defaults::INSTITUTIONS)
    }
}

/// Everything one ranking run needs: the query, its cap, and the scoring lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfiguration {
    /// Query in PubMed syntax, forwarded verbatim.
    pub query: String,

    /// Maximum number of identifiers requested (1..=250).
    pub max_results: usize,

    /// Scoring lists.
    pub profile: ScoringProfile,
}

impl SearchConfiguration {
    /// Configuration with the default cap of 250 results.
    #[must_use]
    pub fn new(query: impl Into<String>, profile: ScoringProfile) -> Self {
        Self { query: query.into(), max_results: api::MAX_RESULTS, profile }
    }

    /// Set the result cap, clamped to 1..=250.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, api::MAX_RESULTS);
        self
    }
}

impl Default for SearchConfiguration {
    fn default() -> Self {
        Self::new(defaults::QUERY, ScoringProfile::default())
    }
}

fn normalize<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
