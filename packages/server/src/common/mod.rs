pub mod structured;

pub use structured::{lenient, ParseError, StructuredReply};
