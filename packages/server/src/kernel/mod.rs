//! Kernel module - collaborator traits, adapters and dependencies.

pub mod ai;
pub mod bounded;
pub mod contact_assist;
pub mod deps;
pub mod providers;
pub mod test_dependencies;
pub mod traits;

pub use ai::{ChatCompletionsClient, UnavailableAI};
pub use bounded::{bounded, CollaboratorError};
pub use contact_assist::AiContactAssist;
pub use deps::{TriageDeps, TriageSettings};
pub use providers::UnconfiguredProvider;
pub use test_dependencies::{MockAI, MockProviders, TestDependencies};
pub use traits::*;

// Re-export from extraction library for easy access
pub use contact_extraction::{
    ContactAggregator, ContactMap, ContactOutcome, ContactRecord, ErrorTag, MockFetcher,
    MockWebSearcher, ProgressSink, RecordingProgress, SearchResult, WebSearcher,
};
