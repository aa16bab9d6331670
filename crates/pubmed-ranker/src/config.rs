//! Configuration for the PubMed ranker.

use std::num::NonZeroU32;
use std::time::Duration;

/// E-utilities configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for NCBI E-utilities.
    pub const EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// Database queried by both esearch and efetch.
    pub const DATABASE: &str = "pubmed";

    /// Base URL for human-facing article pages.
    pub const ARTICLE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";

    /// Default and maximum number of identifiers requested from esearch.
    pub const MAX_RESULTS: usize = 250;

    /// Per-article fetch timeout.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Request timeout for a single HTTP exchange.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Requests per second without an API key (NCBI policy).
    pub const REQUESTS_PER_SECOND: u32 = 3;

    /// Requests per second with an API key (NCBI policy).
    pub const REQUESTS_PER_SECOND_WITH_KEY: u32 = 10;

    /// Default number of efetch requests in flight.
    pub const MAX_CONCURRENCY: usize = 3;

    /// Retries for transient failures (5xx, 429, timeouts).
    pub const MAX_RETRIES: u32 = 2;

    /// Maximum idle connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Tool name reported to NCBI.
    pub const TOOL_NAME: &str = "pubmed-ranker";
}

/// Built-in inputs used when the caller supplies none.
pub mod defaults {
    /// Search query used by the CLI when `--query` is omitted.
    pub const QUERY: &str =
        r#"("Endocrinology" OR "Diabetes") AND 2024/10/01:2025/06/28[Date - Publication]"#;

    /// High-impact journals, one per line.
    pub const JOURNALS: &str = "N Engl J Med\nJAMA\nBMJ\nLancet\nNature\nScience\nCell";

    /// Renowned institutions, one per line.
    pub const INSTITUTIONS: &str = "Harvard\nOxford\nMayo Clinic\nNIH\nStanford\nUCSF\nYale\n\
                                    Cambridge\nKarolinska\nJohns Hopkins";

    /// Title keywords that earn the hot-topic bonus.
    pub const HOT_KEYWORDS: &[&str] =
        &["glp-1", "semaglutide", "tirzepatide", "ai", "machine learning", "telemedicine"];

    /// Publication types that earn the study-design bonus.
    pub const VALUED_PUBLICATION_TYPES: &[&str] = &[
        "randomized controlled trial",
        "systematic review",
        "meta-analysis",
        "guideline",
        "practice guideline",
    ];

    /// File name suggested for CSV exports.
    pub const EXPORT_FILE_NAME: &str = "ranked_pubmed_results.csv";
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// NCBI API key (optional, raises the rate limit).
    pub api_key: Option<String>,

    /// Contact email reported to NCBI (optional).
    pub email: Option<String>,

    /// Base URL for E-utilities (for testing with mock servers).
    pub eutils_url: String,

    /// Timeout for a single HTTP exchange.
    pub request_timeout: Duration,

    /// Timeout for one article fetch, retries included.
    pub fetch_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Sustained request rate towards E-utilities.
    pub requests_per_second: NonZeroU32,

    /// Maximum number of efetch requests in flight.
    pub max_concurrency: usize,

    /// Retries for transient failures.
    pub max_retries: u32,
}

impl Config {
    /// Create a new configuration with optional API key.
    ///
    /// The rate limit follows NCBI policy: 3 req/s without a key, 10 req/s with one.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let rate = if api_key.is_some() {
            api::REQUESTS_PER_SECOND_WITH_KEY
        } else {
            api::REQUESTS_PER_SECOND
        };
        Self {
            api_key,
            email: None,
            eutils_url: api::EUTILS_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            fetch_timeout: api::FETCH_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            requests_per_second: NonZeroU32::new(rate).unwrap_or(NonZeroU32::MIN),
            max_concurrency: api::MAX_CONCURRENCY,
            max_retries: api::MAX_RETRIES,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: None,
            email: None,
            eutils_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            requests_per_second: NonZeroU32::new(1000).unwrap_or(NonZeroU32::MAX),
            max_concurrency: 4,
            max_retries: 0, // No retries in tests
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `NCBI_API_KEY` and `NCBI_EMAIL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("NCBI_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let email = std::env::var("NCBI_EMAIL").ok().filter(|e| !e.trim().is_empty());
        Ok(Self::new(api_key).with_email(email))
    }

    /// Set the contact email reported to NCBI.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Set the number of concurrent article fetches (at least one).
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// esearch endpoint URL.
    #[must_use]
    pub fn esearch_url(&self) -> String {
        format!("{}/esearch.fcgi", self.eutils_url)
    }

    /// efetch endpoint URL.
    #[must_use]
    pub fn efetch_url(&self) -> String {
        format!("{}/efetch.fcgi", self.eutils_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
