//! Error types for the PubMed ranker.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Transport error (connection, DNS, TLS, middleware)
    #[error("HTTP error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by E-utilities (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Classify a transport failure, keeping timeouts distinct.
    #[must_use]
    pub fn from_transport(err: reqwest_middleware::Error, timeout: Duration) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => Self::Timeout(timeout),
            other => Self::Middleware(other),
        }
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::BadRequest { .. } => Some(400),
            Self::Server { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single article was left out of the report.
///
/// Every fetch failure collapses into one of these; none of them aborts a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// efetch answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// efetch answered with an empty body.
    #[error("empty response body")]
    EmptyBody,

    /// The body was not well-formed XML.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The document held no `PubmedArticle` element.
    #[error("no PubmedArticle element in response")]
    NoArticle,

    /// The fetch exceeded its individual timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or middleware failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ClientError> for SkipReason {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout(after) => Self::Timeout(after),
            other => match other.status() {
                Some(status) => Self::Status(status),
                None => Self::Transport(other.to_string()),
            },
        }
    }
}

/// Errors that abort a whole ranking run.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The search stage could not reach E-utilities or was refused.
    #[error("PubMed search failed: {0}")]
    Search(#[from] ClientError),
}

impl RunError {
    /// Convert to a user-friendly message for the terminal.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Search(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by PubMed. Please wait {:?} before retrying.",
                    retry_after
                )
            }
            Self::Search(ClientError::BadRequest { message }) => {
                format!("PubMed rejected the query: {message}")
            }
            Self::Search(err) => {
                format!("PubMed is unreachable or failing ({err}); no results were retrieved.")
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for ranking runs.
pub type RunResult<T> = Result<T, RunError>;
