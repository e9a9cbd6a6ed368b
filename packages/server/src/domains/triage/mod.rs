//! Emergency query triage.
//!
//! A query is analyzed, classified, and routed to a specialist handler by
//! [`machines::QueryMachine`]. Every remote step has a local tier behind it,
//! and the local protocol sits behind the handlers, so [`handle_query`]
//! always produces an [`AgentResponse`].

pub mod actions;
pub mod activities;
pub mod data;
pub mod errors;
pub mod handlers;
pub mod machines;
pub mod models;

pub use actions::handle_query;
pub use errors::{FatalError, HandlerError};
pub use models::{AgentResponse, InfoType, Intent, IntentDecision, QueryInfo};
