//! PubMed Relevance Ranker
//!
//! Searches PubMed through NCBI E-utilities, fetches metadata for every hit,
//! and ranks the articles with a small set of explainable heuristics.
//!
//! # Features
//!
//! - **Explainable scores**: six additive rules, each reported with a reason
//! - **Fault tolerant**: a failing article is skipped, never fatal
//! - **Async-first**: bounded concurrent fetches on Tokio
//! - **Rate-limited**: respects NCBI request limits
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pubmed_ranker::{
//!     Config, PubMedClient, Ranker, RunOptions, ScoringProfile, SearchConfiguration,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let options = RunOptions::from_config(&config);
//!     let client = PubMedClient::new(config)?;
//!     let ranker = Ranker::new(Arc::new(client), options);
//!
//!     let search = SearchConfiguration::new(
//!         "semaglutide AND 2024[dp]",
//!         ScoringProfile::from_lines("Nature\nLancet", "Stanford\nOxford"),
//!     );
//!     let report = ranker.run(&search).await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod scoring;

pub use client::{FetchOutcome, LiteratureSource, PubMedClient};
pub use config::Config;
pub use error::{ClientError, RunError, SkipReason};
pub use models::{
    ArticleId, ArticleRecord, RankReport, RankedEntry, ScoreResult, ScoringProfile,
    SearchConfiguration,
};
pub use pipeline::{Ranker, RunOptions};
