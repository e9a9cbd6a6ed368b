//! Data types shared across extraction, aggregation and the collaborator traits.

pub mod contact;

pub use contact::{ContactOutcome, ContactRecord, ErrorTag};
