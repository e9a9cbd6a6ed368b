//! AI-assisted contact extraction.
//!
//! The deterministic extractor misses contacts written in prose ("reach the
//! county desk at five five five ...") or split across odd markup. When it
//! finds nothing reachable on a page, the aggregator can hand the same text
//! to a model-backed extractor. Implementations live with the application,
//! which owns the inference client.

use async_trait::async_trait;

use crate::error::AssistError;
use crate::types::ContactRecord;

/// Secondary contact extraction backed by a language model.
#[async_trait]
pub trait ContactAssist: Send + Sync {
    /// Extract contacts from page text.
    ///
    /// Must build the record through [`ContactRecord::new`] so the
    /// deduplication and disjointness rules hold for assisted output too.
    async fn extract_contacts(&self, url: &str, text: &str) -> Result<ContactRecord, AssistError>;
}
