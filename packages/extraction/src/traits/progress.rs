//! Progress notifications.
//!
//! Long-running steps report what they are doing through a [`ProgressSink`].
//! Notifications are fire-and-forget: a sink cannot fail the caller, and the
//! caller never waits on it.

use std::sync::{Arc, Mutex};
use tracing::info;

/// Receives `(source, message)` progress notifications.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, source: &str, message: &str);
}

/// Logs every notification through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn notify(&self, source: &str, message: &str) {
        info!(source = %source, "{}", message);
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn notify(&self, _source: &str, _message: &str) {}
}

/// Keeps notifications in memory so tests can assert on them.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(source, message)` pairs received so far.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages from one source.
    pub fn messages_from(&self, source: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(s, _)| s == source)
            .map(|(_, m)| m)
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn notify(&self, source: &str, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((source.to_string(), message.to_string()));
        }
    }
}
