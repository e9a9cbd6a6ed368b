//! Static reference data for the local tiers.

pub mod contacts;
pub mod gazetteer;
pub mod keywords;
pub mod safety;

pub use contacts::DirectoryContact;
pub use gazetteer::Place;
pub use safety::{numbered, safety_instructions, safety_warning};

pub const LOCATION_PROMPT: &str =
    "I need to know your location to help with this request. Can you share your current location?";

/// Last-resort reply when even the local protocol could not produce an answer.
pub const FATAL_MESSAGE: &str = "I apologize, but I encountered an error while processing your request.\n\n\
     If this is a life-threatening emergency, please immediately contact your local emergency services:\n\
     - In most countries, dial 911 or 112 for emergency services\n\
     - If possible, provide clear details about your location and situation\n\n\
     Please try again with your request in a moment.";

/// Appended to every answer produced by the local protocol.
pub const LOCAL_PROTOCOL_MARKER: &str = "[generated via local protocol]";
