//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{truncate_chars, PageFetcher, RawPage};

/// Mock fetcher with canned pages.
///
/// Unknown URLs fail with an HTTP 404. URLs marked with `with_failure` fail
/// with a connection error and URLs marked with `with_delay` sleep before
/// answering, which lets tests drive the aggregator's timeout.
///
/// ```rust
/// use contact_extraction::fetchers::MockFetcher;
///
/// let fetcher = MockFetcher::new()
///     .with_page("https://county.gov/flood", "Emergency Hotline: (800) 555-0123")
///     .with_failure("https://down.example.org");
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn with_page(self, url: &str, content: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), content.to_string());
        self
    }

    /// Make `url` fail with a connection error.
    pub fn with_failure(self, url: &str) -> Self {
        self.failures.write().unwrap().insert(url.to_string());
        self
    }

    /// Sleep before answering for `url`.
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.to_string(), delay);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str, max_chars: usize) -> FetchResult<RawPage> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.read().unwrap().contains(url) {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock connection refused",
            ))));
        }

        let content = self.pages.read().unwrap().get(url).cloned();
        match content {
            Some(content) => Ok(RawPage::new(url, truncate_chars(&content, max_chars))),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_serves_and_fails() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.org", "hello world")
            .with_failure("https://b.org");

        let page = tokio_test::assert_ok!(fetcher.fetch_page("https://a.org", 5).await);
        assert_eq!(page.content, "hello");

        let err = tokio_test::assert_err!(fetcher.fetch_page("https://b.org", 5).await);
        assert_eq!(err.tag(), "fetch_failed");

        let err = fetcher.fetch_page("https://c.org", 5).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        assert_eq!(fetcher.call_count(), 3);
    }
}
