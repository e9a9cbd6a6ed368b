//! Typed errors for the contact extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! timed-out fetch from a malformed assist reply without string matching.

use thiserror::Error;

/// Errors that can occur while fetching a single page.
///
/// A fetch failure is always scoped to one URL; the aggregator records it
/// and moves on to the next source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection refused, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The fetch did not complete within its bounded wait
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Page fetched but carried no text
    #[error("empty page: {url}")]
    EmptyPage { url: String },
}

impl FetchError {
    /// Short machine-readable tag recorded in aggregation results.
    pub fn tag(&self) -> &'static str {
        match self {
            FetchError::Http(_) | FetchError::Status { .. } => "fetch_failed",
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Timeout { .. } => "timeout",
            FetchError::EmptyPage { .. } => "empty_page",
        }
    }
}

/// Errors from a web search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider returned an error response
    #[error("search API error: {0}")]
    Api(String),

    /// Search did not complete within its bounded wait
    #[error("search timed out")]
    Timeout,

    /// No provider is configured
    #[error("web search unavailable")]
    Unavailable,
}

/// Errors from the AI-assisted extraction pass.
#[derive(Debug, Error)]
pub enum AssistError {
    /// No inference backend configured
    #[error("contact assist unavailable")]
    Unavailable,

    /// Inference call failed or timed out
    #[error("inference failed: {0}")]
    Inference(String),

    /// Reply could not be read as a contact record
    #[error("malformed assist reply: {0}")]
    Malformed(String),

    /// Reply parsed but named no contacts
    #[error("assist reply contained no contacts")]
    Empty,
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
