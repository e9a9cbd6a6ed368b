//! Rescue: someone needs life-safety help now.

use serde_json::{json, Value};
use tracing::info;

use super::brief::{contactable_aid, render_aid, request_brief, AidSource, TriageBrief};
use super::location::{resolve_location, ResolvedLocation};
use super::gather;
use crate::domains::triage::activities::analyze_query::crisis_or_guess;
use crate::domains::triage::data::safety::{CLOSING_ADVICE, RECOMMENDED_SHELTER};
use crate::domains::triage::data::{numbered, safety_instructions, safety_warning};
use crate::domains::triage::errors::HandlerError;
use crate::domains::triage::models::{AgentResponse, CrisisType, InfoType, Intent, QueryInfo};
use crate::kernel::{
    bounded, ContactMap, HazardReport, SearchResult, TriageDeps, WeatherReport,
};

const PROGRESS_SOURCE: &str = "rescue_agent";

pub async fn handle_rescue(
    query: &str,
    query_info: &QueryInfo,
    deps: &TriageDeps,
) -> Result<AgentResponse, HandlerError> {
    let location = resolve_location(query, query_info, deps, PROGRESS_SOURCE).await;
    let crisis = crisis_or_guess(query_info);
    let mut used_local = location.source.is_local();

    deps.progress.notify(
        PROGRESS_SOURCE,
        &format!(
            "Verifying crisis at {} with official data sources...",
            location.name
        ),
    );

    let search_query = format!(
        "emergency contact numbers {} disaster management",
        location.name
    );
    let (weather, hazards, search) = tokio::join!(
        gather("weather", location.coordinates, deps, |at| deps.weather.alerts(at)),
        gather("hazards", location.coordinates, deps, |at| deps.hazards.detections(at)),
        bounded(
            "search",
            deps.settings.collaborator_timeout,
            deps.web_searcher
                .search_with_limit(&search_query, deps.settings.search_results),
        ),
    );
    let results = search.unwrap_or_default();

    deps.progress.notify(
        PROGRESS_SOURCE,
        "Extracting detailed contact information from official sources...",
    );
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    let contacts = deps.aggregator().collect(&urls).await;
    let local_aid = contactable_aid(&contacts, |url| source_title(&results, url));

    deps.progress.notify(
        PROGRESS_SOURCE,
        "Synthesizing final action plan and safety instructions...",
    );
    let prompt = build_triage_prompt(
        query,
        &location,
        crisis,
        weather.as_ref(),
        hazards.as_ref(),
        &results,
        &contacts,
    );
    let brief = match request_brief::<TriageBrief>(&prompt, deps).await {
        Some(mut brief) if brief.safety_warning.is_some() => {
            if brief.contactable_aid.is_empty() {
                brief.contactable_aid = local_aid;
            }
            brief
        }
        _ => {
            used_local = true;
            local_triage_brief(crisis, &location, local_aid)
        }
    };

    info!(
        location = %location.name,
        crisis = %crisis,
        sources = contacts.len(),
        aid_sources = brief.contactable_aid.len(),
        used_local,
        "Rescue brief ready"
    );

    let steps = if brief.safety_instructions.is_empty() {
        safety_instructions(crisis)
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        brief.safety_instructions.clone()
    };

    let text = render(&brief, &steps);
    let data = json!({
        "location": location.name,
        "coordinates": location.coordinates,
        "crisis_type": crisis.as_str(),
        "urgency_level": query_info.urgency_level.as_str(),
        "contacts": brief.contactable_aid,
        "safety_instructions": steps,
        "weather_alerts": weather.map(|w| w.alerts).unwrap_or_default(),
        "hazard_detections": hazards.map(|h| h.detections.len()).unwrap_or(0),
        "sources": urls,
    });

    Ok(AgentResponse::new(InfoType::RescueInformation, text)
        .with_data(data)
        .with_intent(Intent::Rescue)
        .local(used_local))
}

/// Title of the search result for `url`, or the URL itself.
pub(crate) fn source_title(results: &[SearchResult], url: &str) -> String {
    results
        .iter()
        .find(|r| r.url.as_str() == url)
        .and_then(|r| r.title.clone())
        .unwrap_or_else(|| url.to_string())
}

fn local_triage_brief(
    crisis: CrisisType,
    location: &ResolvedLocation,
    aid: Vec<AidSource>,
) -> TriageBrief {
    TriageBrief {
        safety_warning: Some(safety_warning(crisis, &location.name)),
        recommended_shelter: Some(RECOMMENDED_SHELTER.to_string()),
        contactable_aid: aid,
        safety_instructions: safety_instructions(crisis)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn render(brief: &TriageBrief, steps: &[String]) -> String {
    let steps: Vec<&str> = steps.iter().map(String::as_str).collect();

    format!(
        "SAFETY WARNING:\n{}\n\n\
         SAFETY STEPS:\n{}\n\n\
         SHELTER INFORMATION:\n{}\n\n\
         EMERGENCY CONTACTS:\n{}\n\n\
         {}",
        brief
            .safety_warning
            .as_deref()
            .unwrap_or("No specific safety information available."),
        numbered(&steps),
        brief
            .recommended_shelter
            .as_deref()
            .unwrap_or(RECOMMENDED_SHELTER),
        render_aid(&brief.contactable_aid),
        CLOSING_ADVICE
    )
}

/// Official data as plain lines for the model.
fn verified_data(weather: Option<&WeatherReport>, hazards: Option<&HazardReport>) -> String {
    let mut sections = Vec::new();

    if let Some(report) = weather.filter(|w| !w.alerts.is_empty()) {
        let alerts = report
            .alerts
            .iter()
            .map(|a| format!("- {} ({}): {}", a.kind, a.severity, a.description))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("WEATHER ALERTS:\n{}", alerts));
    }

    if hazards.is_some_and(|h| !h.detections.is_empty()) {
        sections.push("ACTIVE FIRES DETECTED IN YOUR AREA".to_string());
    }

    if sections.is_empty() {
        "No specific alerts from official sources for your exact location.".to_string()
    } else {
        sections.join("\n\n")
    }
}

fn build_triage_prompt(
    query: &str,
    location: &ResolvedLocation,
    crisis: CrisisType,
    weather: Option<&WeatherReport>,
    hazards: Option<&HazardReport>,
    results: &[SearchResult],
    contacts: &ContactMap,
) -> String {
    let actionable: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "name": r.title.as_deref().unwrap_or("Unknown Source"),
                "link": r.url.as_str(),
                "extracted_contact": contacts.get(r.url.as_str()),
            })
        })
        .collect();

    let coordinates = location
        .coordinates
        .map(|c| format!("{}, {}", c.latitude, c.longitude))
        .unwrap_or_else(|| "coordinates unknown".to_string());

    format!(
        r#"You are an AI disaster response assistant named C.L.A.R.I.O.N.
Provide an immediate, actionable, and life-saving brief based on the following information.

USER'S SITUATION:
Query: "{}"
Location: {} ({})
Crisis Type: {}

VERIFIED OFFICIAL DATA:
{}

ACTIONABLE CONTACTS & RESOURCES:
{:#}

YOUR TASK:
Generate a final triage brief as a JSON object with the following structure:
1. "safety_warning": A clear, urgent warning about the immediate danger and what action to take
2. "recommended_shelter": Specific shelter location if available, or instructions on finding shelter
3. "contactable_aid": List of sources, each {{"name": ..., "contacts": [{{"type": ..., "value": ...}}]}}
4. "safety_instructions": List of short, ordered safety steps

Return ONLY the JSON object with no additional text."#,
        query,
        location.name,
        coordinates,
        crisis,
        verified_data(weather, hazards),
        Value::Array(actionable)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::triage::activities::analyze_locally;
    use crate::kernel::{
        MockAI, MockFetcher, MockProviders, MockWebSearcher, TestDependencies, WeatherAlert,
    };

    const SEARCH: &str = "emergency contact numbers Houston disaster management";

    fn houston_deps(ai: MockAI) -> TestDependencies {
        let weather = WeatherReport {
            alerts: vec![WeatherAlert {
                kind: "Flash Flood Warning".to_string(),
                severity: "Severe".to_string(),
                description: "Bayou levels rising".to_string(),
            }],
            ..WeatherReport::default()
        };

        TestDependencies::new()
            .mock_ai(ai)
            .mock_search(MockWebSearcher::new().with_results(
                SEARCH,
                vec![SearchResult::from_url("https://readyharris.example/contacts")
                    .unwrap()
                    .with_title("Ready Harris")],
            ))
            .mock_fetcher(MockFetcher::new().with_page(
                "https://readyharris.example/contacts",
                "Emergency Hotline: (713) 555-0100\nGeneral line 713-555-0199\ninfo@readyharris.example",
            ))
            .mock_providers(MockProviders::new().with_weather(weather))
    }

    #[tokio::test]
    async fn test_local_brief_when_model_is_down() {
        let deps = houston_deps(MockAI::failing());
        let query = "help, water rising near Houston";
        let info = analyze_locally(query);

        let response = handle_rescue(query, &info, &deps.deps()).await.unwrap();
        let text = &response.response_text;

        assert_eq!(response.info_type, InfoType::RescueInformation);
        assert!(response.used_local_fallback);
        assert!(text.starts_with("SAFETY WARNING:\nATTENTION: Possible flood situation reported in Houston."));
        assert!(text.contains("SAFETY STEPS:\n1. Move to higher ground immediately"));
        assert!(text.contains("\nReady Harris:\n- EMERGENCY PHONE: 7135550100\n- PHONE: 7135550199\n- EMAIL: info@readyharris.example"));
        assert!(text.ends_with(CLOSING_ADVICE));
        assert!(deps.providers.was_called("weather"));
        assert_eq!(deps.web_searcher.calls(), vec![SEARCH.to_string()]);
    }

    #[tokio::test]
    async fn test_remote_brief() {
        let ai = MockAI::new().with_response_for(
            "C.L.A.R.I.O.N.",
            r#"{"safety_warning": "Flash flooding on the bayous. Move up now.",
                "recommended_shelter": "George R. Brown Convention Center",
                "safety_instructions": ["Go to the highest floor", "Call 911 if water enters"]}"#,
        );
        let deps = houston_deps(ai);
        let mut info = analyze_locally("flood near Houston, we are trapped");
        info.coordinates = Some(crate::kernel::Coordinates::new(29.7604, -95.3698));

        let response = handle_rescue("flood near Houston, we are trapped", &info, &deps.deps())
            .await
            .unwrap();
        let text = &response.response_text;

        assert!(!response.used_local_fallback);
        assert!(text.contains("Flash flooding on the bayous. Move up now."));
        assert!(text.contains("1. Go to the highest floor\n2. Call 911 if water enters"));
        assert!(text.contains("George R. Brown Convention Center"));
        // Model returned no aid, so the extracted contacts are kept
        assert!(text.contains("- EMERGENCY PHONE: 7135550100"));
        assert!(deps.ai.was_called_with("Flash Flood Warning (Severe): Bayou levels rising"));
    }

    #[tokio::test]
    async fn test_no_sources_still_answers() {
        let deps = TestDependencies::new();
        let info = analyze_locally("earthquake, we are trapped");

        let response = handle_rescue("earthquake, we are trapped", &info, &deps.deps())
            .await
            .unwrap();

        assert!(response.response_text.contains("No specific contact information available."));
        assert!(response.response_text.contains("1. Drop, cover, and hold on"));
        assert!(!deps.providers.was_called("weather"));
    }
}
