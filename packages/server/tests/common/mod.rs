// Common test utilities

#![allow(dead_code)]

use clarion_core::kernel::{MockAI, MockFetcher, SearchResult};
use serde_json::json;

pub const ANALYSIS_PROMPT: &str = "extract key information";
pub const INTENT_PROMPT: &str = "classify its primary intent";
pub const BRIEF_PROMPT: &str = "C.L.A.R.I.O.N.";

pub const HOUSTON_CONTACTS_URL: &str = "https://readyharris.example/contacts";

pub const HOUSTON_CONTACTS_PAGE: &str = "Harris County Emergency Management\n\
    Emergency Hotline: (713) 555-0100\n\
    General line 713-555-0199\n\
    info@readyharris.example";

/// A model that understood the query as a flood in Houston.
pub fn houston_flood_model() -> MockAI {
    MockAI::new()
        .with_response_for(
            ANALYSIS_PROMPT,
            json!({
                "location": "Houston",
                "coordinates": {"latitude": 29.7604, "longitude": -95.3698},
                "location_confidence": 0.95,
                "needs_location_prompt": false,
                "crisis_type": "flood",
                "urgency_level": "high",
                "needs_evacuation": true,
                "has_dependents": true,
            })
            .to_string(),
        )
        .with_response_for(
            INTENT_PROMPT,
            r#"{"intent": "rescue", "confidence": 96, "reasoning": "trapped by rising water"}"#,
        )
}

pub fn houston_result() -> SearchResult {
    SearchResult::from_url(HOUSTON_CONTACTS_URL)
        .expect("valid url")
        .with_title("Ready Harris")
}

pub fn houston_pages() -> MockFetcher {
    MockFetcher::new().with_page(HOUSTON_CONTACTS_URL, HOUSTON_CONTACTS_PAGE)
}
