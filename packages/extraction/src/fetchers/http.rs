//! HTTP-based page fetcher.

use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{truncate_chars, PageFetcher, RawPage};

lazy_static! {
    static ref SCRIPT: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    static ref STYLE: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>").unwrap();
    static ref BOLD: Regex = Regex::new(r"(?is)<(?:b|strong)[^>]*>(.*?)</(?:b|strong)>").unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap();
    static ref BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref BLOCK_END: Regex = Regex::new(r"(?i)</(?:div|tr|address|section|li)>").unwrap();
    static ref CELL_END: Regex = Regex::new(r"(?i)</t[dh]>").unwrap();
    static ref LINK: Regex =
        Regex::new(r#"(?is)<a[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"(?i)<li[^>]*>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref MANY_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
}

/// Fetches pages with a plain HTTP GET and reduces HTML to markdown-ish text.
///
/// Links keep their targets (`[label](tel:...)` survives for the emergency
/// phone pass) and table cells are separated by wide gaps so the address pass
/// can split columns apart again.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a 30 second request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            client,
            user_agent: "ClarionBot/1.0".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Convert HTML to markdown (simplified).
    fn html_to_markdown(html: &str) -> String {
        let text = SCRIPT.replace_all(html, "");
        let text = STYLE.replace_all(&text, "");
        let text = HEADING.replace_all(&text, "\n## $2\n");
        let text = BOLD.replace_all(&text, "**$1**");
        let text = LINK.replace_all(&text, "[$2]($1)");
        let text = PARAGRAPH.replace_all(&text, "$1\n\n");
        let text = BREAK.replace_all(&text, "\n");
        let text = LIST_ITEM.replace_all(&text, "- ");
        let text = BLOCK_END.replace_all(&text, "\n");
        let text = CELL_END.replace_all(&text, "          ");
        let text = TAG.replace_all(&text, "");
        let text = MANY_NEWLINES.replace_all(&text, "\n\n");

        text.replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .trim()
            .to_string()
    }

    fn extract_title(html: &str) -> Option<String> {
        TITLE
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str, max_chars: usize) -> FetchResult<RawPage> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let content = Self::html_to_markdown(&html);
        if content.is_empty() {
            return Err(FetchError::EmptyPage {
                url: url.to_string(),
            });
        }

        let mut page = RawPage::new(url, truncate_chars(&content, max_chars));
        page.fetched_at = Utc::now();
        if let Some(title) = Self::extract_title(&html) {
            page = page.with_title(title);
        }

        debug!(url = %url, content_length = page.content.len(), "Page fetched successfully");
        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_markdown_keeps_tel_links() {
        let html = r#"
            <h1>County Emergency Management</h1>
            <p>Call <a href="tel:6125550100">612-555-0100</a> any time.</p>
            <script>var x = "555-000-0000";</script>
        "#;

        let md = HttpFetcher::html_to_markdown(html);

        assert!(md.contains("## County Emergency Management"));
        assert!(md.contains("[612-555-0100](tel:6125550100)"));
        assert!(!md.contains("555-000-0000"));
    }

    #[test]
    fn test_table_cells_become_wide_gaps() {
        let html = "<table><tr><td>450 Oak Ave, Houston</td><td>900 Pine Rd, Houston</td></tr></table>";
        let md = HttpFetcher::html_to_markdown(html);
        assert!(md.contains("450 Oak Ave, Houston          900 Pine Rd, Houston"));
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Flood Shelters</title></head></html>";
        assert_eq!(HttpFetcher::extract_title(html), Some("Flood Shelters".to_string()));
        assert_eq!(HttpFetcher::extract_title("<html></html>"), None);
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let fetcher = HttpFetcher::new();
        let err = fetcher.fetch_page("file:///etc/passwd", 100).await.unwrap_err();
        assert_eq!(err.tag(), "invalid_url");

        let err = fetcher.fetch_page("not a url", 100).await.unwrap_err();
        assert_eq!(err.tag(), "invalid_url");
    }
}
