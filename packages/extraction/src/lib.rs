//! Contact Extraction Library
//!
//! Pulls structured contact details (emergency hotlines, ordinary phone
//! numbers, emails, postal addresses) out of crawled page text, and
//! aggregates them across a batch of sources.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use contact_extraction::{extract, ContactAggregator, HttpFetcher};
//!
//! // Single text, no I/O
//! let record = extract("Emergency Hotline: (800) 555-0123");
//!
//! // Many sources
//! let aggregator = ContactAggregator::new(Arc::new(HttpFetcher::new()));
//! let contacts = aggregator.collect(&["https://www.ready.gov/floods"]).await;
//! ```
//!
//! # Modules
//!
//! - [`extractor`] - Deterministic four-pass extraction
//! - [`aggregator`] - Batch fetch + extract with optional assisted pass
//! - [`traits`] - Collaborator interfaces (fetch, search, assist, progress)
//! - [`fetchers`] - Page fetcher implementations
//! - [`testing`] - Mock implementations for testing

pub mod aggregator;
pub mod error;
pub mod extractor;
pub mod fetchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

pub use aggregator::{ContactAggregator, ContactMap, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CHARS};
pub use error::{AssistError, FetchError, FetchResult, SearchError};
pub use extractor::{extract, extract_opt, normalize_phone};
pub use fetchers::{HttpFetcher, MockFetcher};
pub use security::SecretString;
pub use traits::{
    assist::ContactAssist,
    fetcher::{truncate_chars, PageFetcher, RawPage},
    progress::{NoopProgress, ProgressSink, RecordingProgress, TracingProgress},
    searcher::{MockWebSearcher, NoopWebSearcher, SearchResult, TavilyWebSearcher, WebSearcher},
};
pub use types::{ContactOutcome, ContactRecord, ErrorTag};
