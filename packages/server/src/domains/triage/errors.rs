//! Errors raised inside the triage cascade.
//!
//! Neither type ever leaves `handle_query`: a `HandlerError` sends the query
//! to the local protocol and a `FatalError` becomes the static emergency
//! message.

use contact_extraction::SearchError;
use thiserror::Error;

/// A specialist handler could not produce an answer.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Web search failed outright (empty results are not an error)
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// The handler panicked
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// A collaborator the handler cannot do without failed
    #[error("collaborator failed: {0}")]
    Collaborator(String),
}

/// The local protocol itself could not answer.
#[derive(Debug, Error)]
#[error("local protocol failed: {reason}")]
pub struct FatalError {
    pub reason: String,
}

impl FatalError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
