//! Contact aggregation across a batch of URLs.
//!
//! Sources are processed one at a time in input order. Each fetch is bounded
//! by a timeout, and a failed source is recorded as a [`ContactOutcome::Failed`]
//! entry without affecting the rest of the batch.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::extractor::extract;
use crate::traits::assist::ContactAssist;
use crate::traits::fetcher::PageFetcher;
use crate::traits::progress::{NoopProgress, ProgressSink};
use crate::types::{ContactOutcome, ContactRecord, ErrorTag};

/// Default cap on fetched page length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Default bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

const PROGRESS_SOURCE: &str = "contact_aggregator";

/// URL → outcome, in first-seen input order.
pub type ContactMap = IndexMap<String, ContactOutcome>;

/// Runs the extractor over a set of URLs.
///
/// ```rust,ignore
/// let aggregator = ContactAggregator::new(Arc::new(HttpFetcher::new()))
///     .with_assist(assist)
///     .with_progress(Arc::new(TracingProgress));
///
/// let contacts = aggregator.collect(&urls).await;
/// for (url, outcome) in &contacts {
///     if let Some(record) = outcome.record() {
///         println!("{url}: {:?}", record.emergency_phones());
///     }
/// }
/// ```
#[derive(Clone)]
pub struct ContactAggregator {
    fetcher: Arc<dyn PageFetcher>,
    assist: Option<Arc<dyn ContactAssist>>,
    progress: Arc<dyn ProgressSink>,
    max_chars: usize,
    fetch_timeout: Duration,
}

impl ContactAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            assist: None,
            progress: Arc::new(NoopProgress),
            max_chars: DEFAULT_MAX_CHARS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Second-chance extraction for pages where nothing reachable was found.
    pub fn with_assist(mut self, assist: Arc<dyn ContactAssist>) -> Self {
        self.assist = Some(assist);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fetch and extract every URL. Never fails as a whole.
    ///
    /// A URL listed twice is processed once, at its first position.
    pub async fn collect<S: AsRef<str>>(&self, urls: &[S]) -> ContactMap {
        let mut contacts = ContactMap::new();

        for url in urls.iter().map(AsRef::as_ref) {
            if contacts.contains_key(url) {
                debug!(url = %url, "Skipping duplicate source");
                continue;
            }

            let outcome = self.collect_one(url).await;
            contacts.insert(url.to_string(), outcome);
        }

        info!(
            sources = contacts.len(),
            failed = contacts.values().filter(|o| o.is_failed()).count(),
            fetcher = self.fetcher.name(),
            "Contact aggregation completed"
        );

        contacts
    }

    async fn collect_one(&self, url: &str) -> ContactOutcome {
        self.progress
            .notify(PROGRESS_SOURCE, &format!("Fetching {}", url));

        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch_page(url, self.max_chars),
        )
        .await
        .unwrap_or_else(|_| {
            Err(FetchError::Timeout {
                url: url.to_string(),
            })
        });

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Source fetch failed");
                self.progress
                    .notify(PROGRESS_SOURCE, &format!("Could not fetch {}: {}", url, e));
                return ContactOutcome::Failed {
                    error: ErrorTag::from(&e),
                };
            }
        };

        let mut record = extract(&page.content);

        if record.has_no_reachable_contact() {
            if let Some(assisted) = self.assisted(url, &page.content).await {
                record = assisted;
            }
        }

        self.progress.notify(
            PROGRESS_SOURCE,
            &format!(
                "Found {} emergency numbers, {} phone numbers, {} emails at {}",
                record.emergency_phones().len(),
                record.phones().len(),
                record.emails().len(),
                url
            ),
        );

        ContactOutcome::Found { record }
    }

    /// Model-backed pass; `None` keeps the deterministic record.
    async fn assisted(&self, url: &str, text: &str) -> Option<ContactRecord> {
        let assist = self.assist.as_ref()?;
        debug!(url = %url, "No contacts found, trying assisted extraction");

        let result = tokio::time::timeout(self.fetch_timeout, assist.extract_contacts(url, text))
            .await
            .ok()?;

        match result {
            Ok(record) if !record.is_empty() => Some(record),
            Ok(_) => None,
            Err(e) => {
                warn!(url = %url, error = %e, "Assisted extraction failed");
                None
            }
        }
    }
}
