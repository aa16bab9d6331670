//! Article identifiers and extracted article metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::api;

/// Sentinel used when an article carries no usable publication date.
pub const DATE_NOT_AVAILABLE: &str = "N/A";

/// PubMed identifier (PMID). Opaque; compared by equality only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public PubMed page for this article.
    #[must_use]
    pub fn link(&self) -> String {
        format!("{}/{}/", api::ARTICLE_URL, self.0)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Flat metadata for one article, ready for scoring and display.
///
/// `title`, `journal`, `publication_types` and `affiliations` hold lower-cased
/// text so every downstream match is case-insensitive. The original spelling of
/// the title and journal is kept in `display_title` and `display_journal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed identifier.
    pub id: ArticleId,

    /// Article title as published.
    pub display_title: String,

    /// Journal name as published.
    pub display_journal: String,

    /// Lower-cased title.
    pub title: String,

    /// Lower-cased journal name.
    pub journal: String,

    /// Publication year, free-text date, or `"N/A"`.
    pub date: String,

    /// Lower-cased publication type labels.
    pub publication_types: Vec<String>,

    /// Number of author entries.
    pub author_count: usize,

    /// Lower-cased affiliation strings.
    pub affiliations: Vec<String>,

    /// Whether the record lists research grants.
    pub has_funding: bool,
}

impl ArticleRecord {
    /// Empty record for `id`: no title, no journal, date `"N/A"`.
    #[must_use]
    pub fn new(id: impl Into<ArticleId>) -> Self {
        Self { id: id.into(), date: DATE_NOT_AVAILABLE.to_string(), ..Self::default() }
    }

    /// Set the title, keeping the original and a lower-cased copy.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        let title = title.trim();
        self.display_title = title.to_string();
        self.title = title.to_lowercase();
        self
    }

    /// Set the journal, keeping the original and a lower-cased copy.
    #[must_use]
    pub fn with_journal(mut self, journal: &str) -> Self {
        let journal = journal.trim();
        self.display_journal = journal.to_string();
        self.journal = journal.to_lowercase();
        self
    }

    /// Set the publication date text.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the publication types (lower-cased).
    #[must_use]
    pub fn with_publication_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.publication_types = lowercase_all(types);
        self
    }

    /// Set the number of authors.
    #[must_use]
    pub const fn with_author_count(mut self, count: usize) -> Self {
        self.author_count = count;
        self
    }

    /// Set the affiliations (lower-cased).
    #[must_use]
    pub fn with_affiliations<I, S>(mut self, affiliations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.affiliations = lowercase_all(affiliations);
        self
    }

    /// Set the funding flag.
    #[must_use]
    pub const fn with_funding(mut self, has_funding: bool) -> Self {
        self.has_funding = has_funding;
        self
    }

    /// Public PubMed page for this article.
    #[must_use]
    pub fn link(&self) -> String {
        self.id.link()
    }
}

fn lowercase_all<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
