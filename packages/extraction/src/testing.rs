//! Testing utilities including mock implementations.
//!
//! These let applications exercise aggregation without real network or model
//! calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::AssistError;
use crate::traits::assist::ContactAssist;
use crate::types::ContactRecord;

pub use crate::fetchers::MockFetcher;
pub use crate::traits::progress::RecordingProgress;
pub use crate::traits::searcher::MockWebSearcher;

/// A mock assisted extractor.
///
/// Returns the record registered for a URL, the default record otherwise, or
/// `AssistError::Unavailable` when neither is set.
#[derive(Default, Clone)]
pub struct MockContactAssist {
    records: Arc<RwLock<HashMap<String, ContactRecord>>>,
    default_record: Option<ContactRecord>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockContactAssist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record returned for a specific URL.
    pub fn with_record(self, url: &str, record: ContactRecord) -> Self {
        self.records
            .write()
            .unwrap()
            .insert(url.to_string(), record);
        self
    }

    /// Record returned for any other URL.
    pub fn with_default(mut self, record: ContactRecord) -> Self {
        self.default_record = Some(record);
        self
    }

    /// URLs the assist was asked about.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContactAssist for MockContactAssist {
    async fn extract_contacts(&self, url: &str, _text: &str) -> Result<ContactRecord, AssistError> {
        self.calls.write().unwrap().push(url.to_string());

        let record = self.records.read().unwrap().get(url).cloned();
        record
            .or_else(|| self.default_record.clone())
            .ok_or(AssistError::Unavailable)
    }
}
