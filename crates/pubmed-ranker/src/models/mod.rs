//! Data models for PubMed articles, run inputs and ranked output.
//!
//! Matching fields are lower-cased when a record is built, so the scorer
//! never has to care about letter case.

mod article;
mod query;
mod ranking;

pub use article::{ArticleId, ArticleRecord, DATE_NOT_AVAILABLE};
pub use query::{ScoringProfile, SearchConfiguration};
pub use ranking::{RankReport, RankedEntry, ScoreResult, SkippedArticle};
