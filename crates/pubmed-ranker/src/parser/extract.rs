//! Projection of a parsed article into an [`ArticleRecord`].

use super::PubmedArticle;
use crate::models::{ArticleId, ArticleRecord, DATE_NOT_AVAILABLE};

/// Build the scoring record for `article`, fetched as `id`.
///
/// Total: every missing field falls back to an empty value.
#[must_use]
pub fn extract(id: &ArticleId, article: &PubmedArticle) -> ArticleRecord {
    ArticleRecord::new(id.clone())
        .with_title(article.title.as_deref().unwrap_or_default())
        .with_journal(article.journal.as_deref().unwrap_or_default())
        .with_date(resolve_date(article.year.as_deref(), article.medline_date.as_deref()))
        .with_publication_types(&article.publication_types)
        .with_author_count(article.author_count)
        .with_affiliations(&article.affiliations)
        .with_funding(article.has_grant_list)
}

/// Structured year first, then the free-text `MedlineDate`, then `"N/A"`.
///
/// Blank values count as absent.
#[must_use]
pub fn resolve_date(year: Option<&str>, medline_date: Option<&str>) -> String {
    [year, medline_date]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(DATE_NOT_AVAILABLE)
        .to_string()
}
