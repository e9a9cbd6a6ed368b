//! Local emergency protocol.
//!
//! Answers from the static tables alone: no inference, no search, no
//! providers. This is what the user gets when a specialist handler fails.

use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info};

use crate::domains::triage::data::{
    contacts, numbered, safety_instructions, DirectoryContact, LOCAL_PROTOCOL_MARKER,
};
use crate::domains::triage::errors::{panic_message, FatalError};
use crate::domains::triage::models::{AgentResponse, CrisisType, InfoType, Intent, QueryInfo};

use super::analyze_query::local_crisis;
use super::classify_intent::local_intent;

/// Build the local-protocol answer for a query.
pub fn respond(query: &str, query_info: &QueryInfo) -> Result<AgentResponse, FatalError> {
    catch_unwind(AssertUnwindSafe(|| render(query, query_info))).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        error!(reason = %reason, "Local protocol failed");
        FatalError::new(reason)
    })
}

fn render(query: &str, query_info: &QueryInfo) -> AgentResponse {
    let intent = local_intent(query);
    let crisis = match query_info.crisis_type {
        CrisisType::Unknown => local_crisis(query),
        known => known,
    };
    info!(intent = %intent, crisis = %crisis, "Answering with local protocol");

    let (body, contacts_used) = match intent {
        Intent::Rescue => (rescue_text(query_info, crisis), vec![contacts::GENERAL]),
        Intent::Resource => {
            let directory = contacts::directory_for(query, query_info.needs_medical, crisis);
            (resource_text(query_info, &directory), directory)
        }
        Intent::Information | Intent::PendingLocation => {
            (information_text(query_info, crisis), vec![contacts::GENERAL])
        }
    };

    AgentResponse::new(
        InfoType::LocalFallback,
        format!("{}\n\n{}", body, LOCAL_PROTOCOL_MARKER),
    )
    .with_data(json!({
        "intent": intent.as_str(),
        "crisis_type": crisis.as_str(),
        "location": query_info.location,
        "safety_instructions": safety_instructions(crisis),
        "emergency_contacts": contacts_used,
    }))
    .with_intent(intent)
    .local(true)
}

fn rescue_text(query_info: &QueryInfo, crisis: CrisisType) -> String {
    let location = query_info.location.as_deref().unwrap_or("your area");
    format!(
        "EMERGENCY RESCUE INFORMATION:\n\n\
         For your location ({}), please follow these safety instructions:\n\n\
         {}\n\n\
         Contact emergency services immediately: {}",
        location,
        numbered(safety_instructions(crisis)),
        contacts::GENERAL.number
    )
}

fn resource_text(query_info: &QueryInfo, directory: &[DirectoryContact]) -> String {
    let location = query_info.location.as_deref().unwrap_or("your area");
    let lines = directory
        .iter()
        .map(DirectoryContact::line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "EMERGENCY RESOURCE INFORMATION:\n\n\
         For resources in {}, please contact the following services:\n\n{}",
        location, lines
    )
}

fn information_text(query_info: &QueryInfo, crisis: CrisisType) -> String {
    let heading = match &query_info.location {
        Some(location) => format!("Information for {} emergency in {}:", crisis, location),
        None => format!("General information for {} emergency:", crisis),
    };

    format!(
        "EMERGENCY INFORMATION:\n\n{}\n\n{}\n\n\
         For more information, contact: {} at {}",
        heading,
        numbered(safety_instructions(crisis)),
        contacts::GENERAL.name,
        contacts::GENERAL.number
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::triage::activities::analyze_locally;
    use crate::domains::triage::models::Tier;

    fn info_for(query: &str) -> QueryInfo {
        analyze_locally(query)
    }

    #[test]
    fn test_rescue_uses_crisis_table() {
        let query = "help, we are trapped by the flood in Houston, Texas";
        let response = respond(query, &info_for(query)).unwrap();

        assert_eq!(response.info_type, InfoType::LocalFallback);
        assert_eq!(response.intent, Some(Intent::Rescue));
        assert!(response.used_local_fallback);
        assert!(!response.is_error);
        assert!(response.response_text.starts_with("EMERGENCY RESCUE INFORMATION:"));
        assert!(response.response_text.contains("1. Move to higher ground immediately"));
        assert!(response.response_text.contains("Contact emergency services immediately: 911"));
        assert!(response.response_text.ends_with(LOCAL_PROTOCOL_MARKER));
    }

    #[test]
    fn test_resource_directory_choice() {
        let query = "where can I find poison control after the fire";
        let response = respond(query, &info_for(query)).unwrap();
        let text = &response.response_text;

        assert_eq!(response.intent, Some(Intent::Resource));
        assert!(text.contains("- Fire Department: 911"));
        assert!(text.contains("- Poison Control: 1-800-222-1222"));
        assert!(!text.contains("FEMA"));

        let query = "find a doctor, my arm is bleeding";
        let response = respond(query, &info_for(query)).unwrap();
        assert!(response.response_text.contains("- Emergency Medical Services: 911"));
    }

    #[test]
    fn test_information_without_location() {
        let query = "is there a tornado watch tonight";
        let mut info = QueryInfo::blank(query, Tier::Local);
        info.crisis_type = CrisisType::Tornado;
        let response = respond(query, &info.finalize()).unwrap();
        let text = &response.response_text;

        assert_eq!(response.intent, Some(Intent::Information));
        assert!(text.contains("General information for tornado emergency:"));
        assert!(text.contains("For more information, contact: Emergency Services at 911"));
        assert_eq!(response.structured_data["crisis_type"], "tornado");
    }

    #[test]
    fn test_unknown_crisis_is_guessed_from_query() {
        let query = "there is a fire near me";
        let info = QueryInfo::blank(query, Tier::Remote).finalize();
        let response = respond(query, &info).unwrap();

        assert!(response
            .response_text
            .contains("Cover nose and mouth with a wet cloth"));
    }

    #[test]
    fn test_never_empty() {
        for query in ["", " ", "\u{1b}[2J", "???"] {
            let response = respond(query, &info_for(query)).unwrap();
            assert!(response.response_text.contains(LOCAL_PROTOCOL_MARKER));
            assert!(response.intent.is_some());
        }
    }
}
