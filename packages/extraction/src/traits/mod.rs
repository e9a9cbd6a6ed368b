//! Core trait abstractions for the extraction library.
//!
//! These traits define the collaborator interfaces an application provides:
//! page fetching, web search, model-backed extraction and progress reporting.

pub mod assist;
pub mod fetcher;
pub mod progress;
pub mod searcher;
