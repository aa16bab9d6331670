//! NCBI E-utilities client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Token-bucket rate limiting (3 req/s, 10 req/s with an API key)
//!
//! `esearch` turns a query into PMIDs; `efetch` turns one PMID into an
//! [`ArticleRecord`]. Fetches never fail: every problem becomes a
//! [`FetchOutcome::Skipped`].

use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult, SkipReason};
use crate::models::{ArticleId, ArticleRecord};
use crate::parser::{extract, parse_article};

/// Result of fetching one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The article was retrieved and parsed.
    Fetched(ArticleRecord),
    /// The article was left out.
    Skipped(SkipReason),
}

/// Where the ranking pipeline gets its identifiers and articles from.
#[async_trait::async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Identifiers matching `query`, at most `limit`, in relevance order.
    ///
    /// A malformed answer yields an empty list; only an unreachable or
    /// refusing service is an error.
    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<ArticleId>>;

    /// Fetch and extract one article. Never fails.
    async fn fetch(&self, id: &ArticleId) -> FetchOutcome;
}

/// PubMed E-utilities client.
#[derive(Clone)]
pub struct PubMedClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Shared request rate limiter.
    limiter: Arc<DefaultDirectRateLimiter>,

    /// API key (optional).
    api_key: Option<String>,

    /// Contact email (optional).
    email: Option<String>,

    /// esearch endpoint.
    esearch_url: String,

    /// efetch endpoint.
    efetch_url: String,

    /// Per-request timeout.
    request_timeout: Duration,

    /// Per-article fetch timeout.
    fetch_timeout: Duration,
}

impl PubMedClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", api::TOOL_NAME, env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(5))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let limiter = RateLimiter::direct(Quota::per_second(config.requests_per_second));

        Ok(Self {
            client,
            limiter: Arc::new(limiter),
            esearch_url: config.esearch_url(),
            efetch_url: config.efetch_url(),
            api_key: config.api_key,
            email: config.email,
            request_timeout: config.request_timeout,
            fetch_timeout: config.fetch_timeout,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search PubMed and return at most `limit` PMIDs (clamped to 1..=250).
    ///
    /// # Errors
    ///
    /// Returns error when the service is unreachable or answers with a
    /// non-success status. A malformed body yields an empty list instead.
    #[instrument(skip(self))]
    pub async fn search_ids(&self, query: &str, limit: usize) -> ClientResult<Vec<ArticleId>> {
        let limit = limit.clamp(1, api::MAX_RESULTS);
        let params = self.params([
            ("db", api::DATABASE.to_string()),
            ("retmax", limit.to_string()),
            ("retmode", "json".to_string()),
            ("term", query.to_string()),
        ]);

        let response = self.get(&self.esearch_url, &params).await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let ids = parse_id_list(&body, limit);

        debug!(count = ids.len(), "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetch one article and extract its record.
    ///
    /// Total: every failure is reported as a skip. Waiting for a rate-limit
    /// slot is not counted; the fetch timeout starts once the request is sent.
    #[instrument(skip(self), fields(pmid = %id))]
    pub async fn fetch_article(&self, id: &ArticleId) -> FetchOutcome {
        self.limiter.until_ready().await;

        match tokio::time::timeout(self.fetch_timeout, self.try_fetch(id)).await {
            Ok(Ok(record)) => FetchOutcome::Fetched(record),
            Ok(Err(reason)) => {
                debug!(%reason, "Skipping article");
                FetchOutcome::Skipped(reason)
            }
            Err(_) => {
                debug!(timeout = ?self.fetch_timeout, "Article fetch timed out");
                FetchOutcome::Skipped(SkipReason::Timeout(self.fetch_timeout))
            }
        }
    }

    async fn try_fetch(&self, id: &ArticleId) -> Result<ArticleRecord, SkipReason> {
        let params = self.params([
            ("db", api::DATABASE.to_string()),
            ("id", id.to_string()),
            ("retmode", "xml".to_string()),
        ]);

        let response = self.send(&self.efetch_url, &params).await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if body.trim().is_empty() {
            return Err(SkipReason::EmptyBody);
        }

        let article = parse_article(&body)
            .map_err(|e| SkipReason::MalformedXml(e.to_string()))?
            .ok_or(SkipReason::NoArticle)?;

        Ok(extract(id, &article))
    }

    /// Endpoint parameters plus the optional NCBI credentials.
    fn params<const N: usize>(&self, base: [(&'static str, String); N]) -> Vec<(&'static str, String)> {
        let mut params = base.to_vec();
        params.push(("tool", api::TOOL_NAME.to_string()));
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Make a rate-limited GET request.
    async fn get(&self, url: &str, params: &[(&str, String)]) -> ClientResult<reqwest::Response> {
        self.limiter.until_ready().await;
        self.send(url, params).await
    }

    /// Send a GET request; the caller holds the rate-limit slot.
    async fn send(&self, url: &str, params: &[(&str, String)]) -> ClientResult<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.request_timeout))?;

        self.handle_response(response).await
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        ClientError::from_transport(err.into(), self.request_timeout)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);

                Err(ClientError::rate_limited(retry_after))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

#[async_trait::async_trait]
impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<ArticleId>> {
        self.search_ids(query, limit).await
    }

    async fn fetch(&self, id: &ArticleId) -> FetchOutcome {
        self.fetch_article(id).await
    }
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient")
            .field("has_api_key", &self.has_api_key())
            .field("esearch_url", &self.esearch_url)
            .field("efetch_url", &self.efetch_url)
            .finish()
    }
}

/// Read `esearchresult.idlist` from an esearch JSON body.
///
/// Malformed JSON or a missing list yields no identifiers.
fn parse_id_list(body: &str, limit: usize) -> Vec<ArticleId> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "esearch returned malformed JSON");
            return Vec::new();
        }
    };

    if let Some(message) = value.pointer("/esearchresult/ERROR").and_then(Value::as_str) {
        warn!(error = message, "esearch reported an error");
    }

    let Some(ids) = value.pointer("/esearchresult/idlist").and_then(Value::as_array) else {
        warn!("esearch response has no idlist");
        return Vec::new();
    };

    ids.iter().filter_map(Value::as_str).map(ArticleId::from).take(limit).collect()
}
