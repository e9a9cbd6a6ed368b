//! Information: weather, evacuation routes and shelters for a place.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::brief::{request_brief, InformationBrief};
use super::gather;
use super::location::{resolve_location, ResolvedLocation};
use crate::common::{lenient, StructuredReply};
use crate::domains::triage::activities::analyze_query::crisis_or_guess;
use crate::domains::triage::data::keywords::{self, mentions_any};
use crate::domains::triage::data::safety::GENERAL_SAFETY_RECOMMENDATION;
use crate::domains::triage::data::{numbered, safety_instructions};
use crate::domains::triage::errors::HandlerError;
use crate::domains::triage::models::{AgentResponse, CrisisType, InfoType, Intent, QueryInfo};
use crate::kernel::{bounded, EvacuationRoute, Shelter, TriageDeps, WeatherReport};

const PROGRESS_SOURCE: &str = "information_agent";

/// Which data the caller asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InformationNeeds {
    pub weather: bool,
    pub evacuation: bool,
    pub shelter: bool,
}

impl InformationNeeds {
    pub const ALL: Self = Self {
        weather: true,
        evacuation: true,
        shelter: true,
    };

    fn none(&self) -> bool {
        !(self.weather || self.evacuation || self.shelter)
    }

    /// An empty selection means "everything".
    fn or_all(self) -> Self {
        if self.none() {
            Self::ALL
        } else {
            self
        }
    }
}

#[derive(Debug, Deserialize)]
struct NeedsReply {
    #[serde(default, deserialize_with = "lenient::flag")]
    weather: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    evacuation: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    shelter: Option<bool>,
}

/// Collected provider data. `None` means unavailable or not asked for.
#[derive(Debug, Default)]
struct Collected {
    weather: Option<WeatherReport>,
    routes: Option<Vec<EvacuationRoute>>,
    shelters: Option<Vec<Shelter>>,
}

pub async fn handle_information(
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
            "Determining what information is needed for {}...",
            location.name
        ),
    );
    let needs = match remote_needs(query, deps).await {
        Some(needs) => needs,
        None => {
            used_local = true;
            local_needs(query)
        }
    };

    deps.progress
        .notify(PROGRESS_SOURCE, "Retrieving up-to-date information...");
    let at = location.coordinates;
    let (weather, routes, shelters) = tokio::join!(
        async {
            if needs.weather {
                gather("weather", at, deps, |at| deps.weather.alerts(at)).await
            } else {
                None
            }
        },
        async {
            if needs.evacuation {
                gather("routes", at, deps, |at| deps.routes.evacuation_routes(at)).await
            } else {
                None
            }
        },
        async {
            if needs.shelter {
                gather("shelters", at, deps, |at| deps.shelters.shelters(at)).await
            } else {
                None
            }
        },
    );
    let collected = Collected {
        weather,
        routes,
        shelters,
    };

    deps.progress
        .notify(PROGRESS_SOURCE, "Synthesizing information response...");
    let prompt = build_information_prompt(query, &location, &collected);
    let text = match request_brief::<InformationBrief>(&prompt, deps).await {
        Some(brief) if brief.summary.is_some() => render_remote(brief, crisis),
        _ => {
            used_local = true;
            render_local(&location, &collected, crisis)
        }
    };

    info!(
        location = %location.name,
        weather = collected.weather.is_some(),
        routes = collected.routes.is_some(),
        shelters = collected.shelters.is_some(),
        used_local,
        "Information answer ready"
    );

    let data = json!({
        "location": location.name,
        "coordinates": location.coordinates,
        "crisis_type": crisis.as_str(),
        "needs": needs,
        "weather": collected.weather,
        "evacuation_routes": collected.routes,
        "shelters": collected.shelters,
        "has_weather_data": collected.weather.is_some(),
        "has_evacuation_data": collected.routes.is_some(),
        "has_shelter_data": collected.shelters.is_some(),
    });

    Ok(AgentResponse::new(InfoType::EmergencyInformation, text)
        .with_data(data)
        .with_intent(Intent::Information)
        .local(used_local))
}

async fn remote_needs(query: &str, deps: &TriageDeps) -> Option<InformationNeeds> {
    let prompt = format!(
        r#"Analyze this query and determine what information the user needs.
Return ONLY a JSON object with boolean keys: "weather", "evacuation", "shelter"

Query: "{}""#,
        query
    );

    let raw = bounded(
        "inference",
        deps.settings.collaborator_timeout,
        deps.ai.complete_json(&prompt),
    )
    .await
    .ok()?;
    let reply: NeedsReply = StructuredReply::parse(&raw).decode().ok()?;

    // A key the model left out counts as wanted
    Some(
        InformationNeeds {
            weather: reply.weather.unwrap_or(true),
            evacuation: reply.evacuation.unwrap_or(true),
            shelter: reply.shelter.unwrap_or(true),
        }
        .or_all(),
    )
}

pub fn local_needs(query: &str) -> InformationNeeds {
    let lower = query.to_lowercase();
    InformationNeeds {
        weather: mentions_any(&lower, keywords::WEATHER_INFO),
        evacuation: mentions_any(&lower, keywords::EVACUATION_INFO),
        shelter: mentions_any(&lower, keywords::SHELTER_INFO),
    }
    .or_all()
}

fn build_information_prompt(query: &str, location: &ResolvedLocation, collected: &Collected) -> String {
    let data = json!({
        "weather": collected.weather,
        "evacuation_routes": collected.routes,
        "shelters": collected.shelters,
    });
    let coordinates = location
        .coordinates
        .map(|c| format!("{}, {}", c.latitude, c.longitude))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        r#"You are an AI assistant named C.L.A.R.I.O.N., helping during a climate emergency.
Generate a clear, informative brief based on the following information:

USER QUERY: "{}"

LOCATION: {} (Coordinates: {})

COLLECTED DATA (null means unavailable):
{:#}

Return a JSON object with:
- "summary": The brief itself, covering weather alerts, evacuation routes and shelter information where available. If information is missing, say so.
- "safety_recommendations": List of short safety recommendations

Keep it factual and actionable."#,
        query, location.name, coordinates, data
    )
}

fn render_remote(brief: InformationBrief, crisis: CrisisType) -> String {
    let recommendations = if brief.safety_recommendations.is_empty() {
        numbered(safety_instructions(crisis))
    } else {
        let steps: Vec<&str> = brief
            .safety_recommendations
            .iter()
            .map(String::as_str)
            .collect();
        numbered(&steps)
    };

    format!(
        "{}\n\nSAFETY RECOMMENDATIONS:\n{}",
        brief.summary.unwrap_or_default(),
        recommendations
    )
}

fn render_local(location: &ResolvedLocation, collected: &Collected, crisis: CrisisType) -> String {
    let mut parts = vec![format!(
        "Here's the latest information for {}:",
        location.name
    )];

    if let Some(weather) = &collected.weather {
        if !weather.alerts.is_empty() {
            parts.push("\nACTIVE WEATHER ALERTS:".to_string());
            parts.extend(
                weather
                    .alerts
                    .iter()
                    .map(|a| format!("- {} ({}): {}", a.kind, a.severity, a.description)),
            );
        }

        let periods: Vec<String> = [("next_24_hours", "Next 24 hours"), ("next_48_hours", "Next 48 hours")]
            .iter()
            .filter_map(|(key, label)| {
                weather
                    .forecast
                    .get(*key)
                    .map(|v| format!("- {}: {}", label, plain(v)))
            })
            .collect();
        if !periods.is_empty() {
            parts.push("\nWEATHER FORECAST:".to_string());
            parts.extend(periods);
        }
    }

    if let Some(routes) = collected.routes.as_ref().filter(|r| !r.is_empty()) {
        parts.push("\nEVACUATION ROUTES:".to_string());
        for route in routes {
            let status = if route.status.eq_ignore_ascii_case("open") {
                String::new()
            } else {
                format!(" ({})", route.status)
            };
            parts.push(format!("- {}{}: {}", route.name, status, route.description));
            parts.extend(
                route
                    .closure_points
                    .iter()
                    .map(|c| format!("  * CLOSURE: {}", c)),
            );
        }
    }

    if let Some(shelters) = collected.shelters.as_ref().filter(|s| !s.is_empty()) {
        parts.push("\nEMERGENCY SHELTERS:".to_string());
        for shelter in shelters {
            let status = if shelter.status.is_empty() {
                String::new()
            } else {
                format!(" ({})", shelter.status)
            };
            parts.push(format!("- {}{}", shelter.name, status));
            parts.push(format!("  Address: {}", shelter.address));
            if let Some(capacity) = shelter.capacity {
                parts.push(format!("  Capacity: {}", capacity));
            }
            if !shelter.amenities.is_empty() {
                parts.push(format!("  Amenities: {}", shelter.amenities.join(", ")));
            }
        }
    }

    if parts.len() == 1 {
        parts.push(
            "\nLive weather, route and shelter data is not available for this location right now."
                .to_string(),
        );
    }

    parts.push("\nSAFETY RECOMMENDATIONS:".to_string());
    parts.push(GENERAL_SAFETY_RECOMMENDATION.to_string());
    parts.push(numbered(safety_instructions(crisis)));

    parts.join("\n")
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::triage::activities::analyze_locally;
    use crate::kernel::{Coordinates, MockAI, MockProviders, TestDependencies};

    fn miami_info(query: &str) -> QueryInfo {
        let mut info = analyze_locally(query);
        info.location = Some("Miami".to_string());
        info.coordinates = Some(Coordinates::new(25.7617, -80.1918));
        info
    }

    fn routes() -> Vec<EvacuationRoute> {
        vec![
            EvacuationRoute {
                name: "I-95 North".to_string(),
                status: "Open".to_string(),
                description: "Primary route out of the county".to_string(),
                closure_points: vec![],
            },
            EvacuationRoute {
                name: "US-1".to_string(),
                status: "Partially Closed".to_string(),
                description: "Use with caution".to_string(),
                closure_points: vec!["Exit 4 flooded".to_string()],
            },
        ]
    }

    #[test]
    fn test_local_needs() {
        assert_eq!(
            local_needs("is the evacuation road open"),
            InformationNeeds {
                weather: false,
                evacuation: true,
                shelter: false,
            }
        );
        assert_eq!(local_needs("what is going on"), InformationNeeds::ALL);
    }

    #[tokio::test]
    async fn test_only_requested_services_are_called() {
        let ai = MockAI::new().with_response_for(
            "boolean keys",
            r#"{"weather": false, "evacuation": true, "shelter": "no"}"#,
        );
        let deps = TestDependencies::new()
            .mock_ai(ai)
            .mock_providers(MockProviders::new().with_routes(routes()));
        let query = "which roads are open out of Miami";

        let response = handle_information(query, &miami_info(query), &deps.deps())
            .await
            .unwrap();
        let text = &response.response_text;

        assert!(deps.providers.was_called("routes"));
        assert!(!deps.providers.was_called("weather"));
        assert!(!deps.providers.was_called("shelters"));
        assert!(text.contains("EVACUATION ROUTES:\n- I-95 North: Primary route out of the county"));
        assert!(text.contains("- US-1 (Partially Closed): Use with caution\n  * CLOSURE: Exit 4 flooded"));
        assert_eq!(response.info_type, InfoType::EmergencyInformation);
        // brief synthesis fell back to local rendering
        assert!(response.used_local_fallback);
    }

    #[tokio::test]
    async fn test_local_rendering_sections() {
        let mut forecast = serde_json::Map::new();
        forecast.insert("next_24_hours".to_string(), json!("Heavy rain"));
        let weather = WeatherReport {
            alerts: vec![crate::kernel::WeatherAlert {
                kind: "Hurricane Warning".to_string(),
                severity: "Extreme".to_string(),
                description: "Landfall expected".to_string(),
            }],
            forecast,
        };
        let shelters = vec![Shelter {
            name: "North High School".to_string(),
            address: "100 School Rd".to_string(),
            status: "Open".to_string(),
            amenities: vec!["water".to_string(), "cots".to_string()],
            capacity: Some(300),
        }];
        let deps = TestDependencies::new().mock_providers(
            MockProviders::new()
                .with_weather(weather)
                .with_routes(routes())
                .with_shelters(shelters),
        );
        let query = "hurricane update please";

        let response = handle_information(query, &miami_info(query), &deps.deps())
            .await
            .unwrap();
        let text = &response.response_text;

        assert!(text.starts_with("Here's the latest information for Miami:"));
        assert!(text.contains("ACTIVE WEATHER ALERTS:\n- Hurricane Warning (Extreme): Landfall expected"));
        assert!(text.contains("WEATHER FORECAST:\n- Next 24 hours: Heavy rain"));
        assert!(text.contains("- North High School (Open)\n  Address: 100 School Rd\n  Capacity: 300\n  Amenities: water, cots"));
        assert!(text.contains("SAFETY RECOMMENDATIONS:"));
        assert!(text.contains("Secure your home and property"));
        assert!(response.used_local_fallback);
    }

    #[tokio::test]
    async fn test_remote_brief() {
        let ai = MockAI::new()
            .with_response_for("boolean keys", r#"{"weather": true}"#)
            .with_response_for(
                "COLLECTED DATA",
                r#"{"summary": "No alerts are active for Miami.", "safety_recommendations": ["Keep your phone charged"]}"#,
            );
        let deps = TestDependencies::new().mock_ai(ai);
        let query = "any weather alerts for Miami";

        let response = handle_information(query, &miami_info(query), &deps.deps())
            .await
            .unwrap();

        assert_eq!(
            response.response_text,
            "No alerts are active for Miami.\n\nSAFETY RECOMMENDATIONS:\n1. Keep your phone charged"
        );
        assert!(!response.used_local_fallback);
        assert_eq!(response.structured_data["has_weather_data"], false);
    }
}
