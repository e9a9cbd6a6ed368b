// C.L.A.R.I.O.N. - Emergency query triage core
//
// Turns a free-text emergency request into a routed, classified answer.
// Every remote step has a local tier behind it, and a static emergency
// response sits behind those, so a query always gets a usable reply.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
pub use domains::triage::{handle_query, AgentResponse};
