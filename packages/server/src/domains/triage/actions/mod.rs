//! Triage actions - entry points called by the binary and by embedders.

mod handle_query;

pub use handle_query::handle_query;
