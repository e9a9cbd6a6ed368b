//! Triage activities - the steps every query passes through.

pub mod analyze_query;
pub mod classify_intent;
pub mod local_fallback;

pub use analyze_query::{analyze, analyze_locally};
pub use classify_intent::{classify, classify_locally, local_intent};
pub use local_fallback::respond;
