//! Search, fetch, score, rank.
//!
//! Fetches run through a buffered stream with at most `max_concurrency`
//! requests in flight. Outcomes are merged by the single task driving the
//! stream, and the final order comes from the sort in [`RankReport::new`],
//! so completion order never shows in the report.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::client::{FetchOutcome, LiteratureSource};
use crate::config::{Config, api};
use crate::error::RunResult;
use crate::models::{RankReport, RankedEntry, SearchConfiguration, SkippedArticle};
use crate::scoring::score;

/// Execution limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of article fetches in flight.
    pub max_concurrency: usize,

    /// Stop after this long and report what has been ranked so far.
    pub run_timeout: Option<Duration>,
}

impl RunOptions {
    /// Options matching a client configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self { max_concurrency: config.max_concurrency.max(1), run_timeout: None }
    }

    /// Set the run deadline.
    #[must_use]
    pub const fn with_run_timeout(mut self, run_timeout: Option<Duration>) -> Self {
        self.run_timeout = run_timeout;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { max_concurrency: api::MAX_CONCURRENCY, run_timeout: None }
    }
}

/// Runs searches against a [`LiteratureSource`] and ranks the results.
#[derive(Clone)]
pub struct Ranker {
    source: Arc<dyn LiteratureSource>,
    options: RunOptions,
}

impl Ranker {
    /// Create a ranker over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn LiteratureSource>, options: RunOptions) -> Self {
        Self { source, options }
    }

    /// Execution limits in use.
    #[must_use]
    pub const fn options(&self) -> RunOptions {
        self.options
    }

    /// Run to completion (or until the configured deadline).
    pub async fn run(&self, config: &SearchConfiguration) -> RunResult<RankReport> {
        self.run_with_cancel(config, &CancellationToken::new()).await
    }

    /// Run until done, the deadline passes, or `cancel` fires.
    ///
    /// A stopped run still returns `Ok` with the entries ranked so far and
    /// `completed == false`; fetches still in flight are dropped whole.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RunError::Search`] when the search stage cannot
    /// reach the service. Per-article failures never abort a run.
    #[instrument(skip_all, fields(query = %config.query, max_results = config.max_results))]
    pub async fn run_with_cancel(
        &self,
        config: &SearchConfiguration,
        cancel: &CancellationToken,
    ) -> RunResult<RankReport> {
        let deadline = self.options.run_timeout.map(|timeout| Instant::now() + timeout);
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        let ids = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("Run cancelled during search");
                return Ok(RankReport::new(config.query.clone(), Vec::new(), 0, Vec::new(), false));
            }
            () = &mut expired => {
                warn!("Run deadline passed during search");
                return Ok(RankReport::new(config.query.clone(), Vec::new(), 0, Vec::new(), false));
            }
            ids = self.source.search(&config.query, config.max_results) => ids?,
        };

        let requested = ids.len();
        info!(count = requested, "Search returned identifiers");

        let source = self.source.as_ref();
        let mut fetches = stream::iter(ids.into_iter().enumerate())
            .map(move |(position, id)| async move {
                let outcome = source.fetch(&id).await;
                (position, id, outcome)
            })
            .buffer_unordered(self.options.max_concurrency.max(1));

        let mut entries = Vec::with_capacity(requested);
        let mut skipped = Vec::new();
        let mut completed = true;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(ranked = entries.len(), "Run cancelled, keeping partial results");
                    completed = false;
                    break;
                }
                () = &mut expired => {
                    warn!(ranked = entries.len(), "Run deadline passed, keeping partial results");
                    completed = false;
                    break;
                }
                next = fetches.next() => match next {
                    Some((position, _, FetchOutcome::Fetched(article))) => {
                        let result = score(&article, &config.profile);
                        debug!(pmid = %article.id, score = result.score, "Scored article");
                        entries.push(RankedEntry { position, article, result });
                    }
                    Some((position, id, FetchOutcome::Skipped(reason))) => {
                        debug!(pmid = %id, %reason, "Article skipped");
                        skipped.push(SkippedArticle { position, id, reason });
                    }
                    None => break,
                },
            }
        }

        info!(ranked = entries.len(), skipped = skipped.len(), completed, "Run finished");
        Ok(RankReport::new(config.query.clone(), entries, requested, skipped, completed))
    }
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker").field("options", &self.options).finish()
    }
}
