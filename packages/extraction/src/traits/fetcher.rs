//! Page fetcher trait for pluggable page collection.
//!
//! The aggregator only needs "give me the text behind this URL". Whether that
//! text comes from a plain HTTP GET, a headless browser or a canned fixture is
//! the fetcher's business.
//!
//! ```rust,ignore
//! use contact_extraction::{HttpFetcher, PageFetcher};
//!
//! let fetcher = HttpFetcher::new();
//! let page = fetcher.fetch_page("https://www.ready.gov/floods", 8000).await?;
//! println!("{} chars from {}", page.content.len(), page.url);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// Raw page content before extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// URL the content was fetched from
    pub url: String,

    /// Page text (markdown or plain text)
    pub content: String,

    /// Page title if available
    pub title: Option<String>,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RawPage {
    /// Create a new raw page with minimal fields.
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            title: None,
            fetched_at: Utc::now(),
        }
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check if this page has content.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Fetches the text behind a single URL.
///
/// Implementations must return at most `max_chars` characters of content and
/// must report failures as [`FetchError`](crate::error::FetchError) rather
/// than panicking; one bad source never aborts a batch.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page, truncating its content to `max_chars` characters.
    async fn fetch_page(&self, url: &str, max_chars: usize) -> FetchResult<RawPage>;

    /// Name of this fetcher (for logging).
    fn name(&self) -> &str;
}

/// Truncate to at most `max_chars` characters without splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
