//! Web searcher trait for source discovery.
//!
//! Handlers that need contact sources they were not given ask a search
//! provider for candidate URLs, then hand those URLs to the
//! [`ContactAggregator`](crate::aggregator::ContactAggregator).
//!
//! ```rust,ignore
//! let results = searcher
//!     .search_with_limit("emergency contact numbers Houston disaster management", 3)
//!     .await?;
//! let urls: Vec<String> = results.iter().map(|r| r.url.to_string()).collect();
//! let contacts = aggregator.collect(&urls).await;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use url::Url;

use crate::error::SearchError;
use crate::security::SecretString;

/// A discovered URL from web search with metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The discovered URL.
    pub url: Url,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,

    /// Relevance score (0.0-1.0, if provided by search API).
    pub score: Option<f32>,
}

impl SearchResult {
    /// Create a new search result from a URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: None,
            snippet: None,
            score: None,
        }
    }

    /// Create from a URL string.
    pub fn from_url(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(Self::new)
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Add a relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Web search trait for open-world discovery.
///
/// # Implementations
///
/// - `TavilyWebSearcher` - Tavily API
/// - `NoopWebSearcher` - No provider configured
/// - `MockWebSearcher` - For testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for URLs relevant to the query.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;

    /// Search with a specific result limit.
    async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results = self.search(query).await?;
        results.truncate(limit);
        Ok(results)
    }
}

/// Mock web searcher for testing.
///
/// Unknown queries return the default results (empty unless set), and
/// `failing()` makes every search return an API error.
#[derive(Default, Clone)]
pub struct MockWebSearcher {
    results: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    default_results: Arc<RwLock<Vec<SearchResult>>>,
    fail: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockWebSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// A searcher whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Add results for a query.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    /// Add URL strings as results.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results: Vec<_> = urls
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect();
        self.with_results(query, results)
    }

    /// Results returned for any query without its own entry.
    pub fn with_default_urls(self, urls: &[&str]) -> Self {
        *self.default_results.write().unwrap() = urls
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect();
        self
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.write().unwrap().push(query.to_string());

        if self.fail {
            return Err(SearchError::Api("mock search failure".to_string()));
        }

        let results = self.results.read().unwrap().get(query).cloned();
        Ok(results.unwrap_or_else(|| self.default_results.read().unwrap().clone()))
    }
}

/// Searcher used when no provider is configured: warns and finds nothing.
pub struct NoopWebSearcher;

#[async_trait]
impl WebSearcher for NoopWebSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        warn!(query = %query, "Web search skipped (no provider configured)");
        Ok(Vec::new())
    }
}

/// Tavily-backed web searcher.
pub struct TavilyWebSearcher {
    api_key: SecretString,
    client: reqwest::Client,
    /// Default number of results to return.
    pub default_limit: usize,
}

impl TavilyWebSearcher {
    /// Create a new Tavily web searcher.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            client: reqwest::Client::new(),
            default_limit: 5,
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the default result limit.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }
}

#[async_trait]
impl WebSearcher for TavilyWebSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search_with_limit(query, self.default_limit).await
    }

    async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        #[derive(serde::Serialize)]
        struct Request {
            query: String,
            search_depth: String,
            max_results: usize,
        }

        #[derive(serde::Deserialize)]
        struct Response {
            results: Vec<TavilyResult>,
        }

        #[derive(serde::Deserialize)]
        struct TavilyResult {
            url: String,
            title: Option<String>,
            content: Option<String>,
            score: Option<f32>,
        }

        let request = Request {
            query: query.to_string(),
            search_depth: "basic".to_string(),
            max_results: limit,
        };

        debug!(query = %query, limit, "Tavily search starting");

        let response = self
            .client
            .post("https://api.tavily.com/search")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("Tavily API error {}: {}", status, body)));
        }

        let tavily_response: Response = response
            .json()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let results = tavily_response
            .results
            .into_iter()
            .filter_map(|r| {
                let url = Url::parse(&r.url).ok()?;
                let mut result = SearchResult::new(url);
                if let Some(title) = r.title {
                    result = result.with_title(title);
                }
                if let Some(content) = r.content {
                    result = result.with_snippet(content);
                }
                if let Some(score) = r.score {
                    result = result.with_score(score);
                }
                Some(result)
            })
            .collect();

        Ok(results)
    }
}
