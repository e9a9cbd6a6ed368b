//! Query analysis: where, what kind of crisis, what is needed, how urgent.
//!
//! The remote tier asks the model for a fixed JSON schema. Any failure there
//! (call error, timeout, unreadable reply) drops to [`analyze_locally`], which
//! works from regexes and keyword tables and cannot fail.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::{lenient, StructuredReply};
use crate::domains::triage::data::keywords::{self, mentions_any};
use crate::domains::triage::models::{CrisisType, QueryInfo, Tier, UrgencyLevel};
use crate::kernel::{bounded, Coordinates, TriageDeps};

pub const PROGRESS_SOURCE: &str = "orchestrator";

/// Confidence assigned to a location found by the local patterns.
pub const LOCAL_LOCATION_CONFIDENCE: f32 = 0.6;

lazy_static! {
    // Ordered: first pattern with a match wins
    static ref LOCATION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bin\s+([a-z]+(?:[ \t]+[a-z]+){0,2}),\s*([a-z]+)").unwrap(),
        Regex::new(r"(?i)\bat\s+([a-z0-9]+(?:[ \t]+[a-z0-9]+){0,3})").unwrap(),
        Regex::new(r"(?i)\bnear\s+([a-z]+(?:[ \t]+[a-z]+){0,2})").unwrap(),
        Regex::new(r"(?i)\b([a-z]+(?:[ \t]+[a-z]+)?)[ \t]+area\b").unwrap(),
    ];

    static ref LEADING_ARTICLE: Regex = Regex::new(r"(?i)^(?:the|my|our)\s+").unwrap();
}

/// Understand a query, remotely if possible.
pub async fn analyze(query: &str, deps: &TriageDeps) -> QueryInfo {
    deps.progress
        .notify(PROGRESS_SOURCE, "Extracting structured information from query...");

    let prompt = build_analysis_prompt(query);
    let reply = bounded(
        "inference",
        deps.settings.collaborator_timeout,
        deps.ai.complete_json(&prompt),
    )
    .await;

    match reply {
        Ok(raw) => match StructuredReply::parse(&raw).decode::<AnalysisReply>() {
            Ok(reply) => {
                let info = reply.into_query_info(query).finalize();
                report_location(&info, deps);
                info!(
                    crisis_type = %info.crisis_type,
                    urgency = %info.urgency_level,
                    has_location = info.has_location(),
                    "Query analyzed"
                );
                return info;
            }
            Err(e) => warn!(error = %e, "Unreadable analysis reply, analyzing locally"),
        },
        Err(e) => warn!(error = %e, "Analysis call failed, analyzing locally"),
    }

    deps.progress
        .notify(PROGRESS_SOURCE, "Falling back to local query processing.");
    let info = analyze_locally(query);
    report_location(&info, deps);
    info
}

fn report_location(info: &QueryInfo, deps: &TriageDeps) {
    let message = match (&info.location, info.needs_location_prompt) {
        (None, _) => "No location detected - will prompt user for location".to_string(),
        (Some(location), true) => format!(
            "Low confidence in detected location: {} - will confirm with user",
            location
        ),
        (Some(location), false) => format!("Location identified: {}", location),
    };
    deps.progress.notify(PROGRESS_SOURCE, &message);
}

fn build_analysis_prompt(query: &str) -> String {
    format!(
        r#"Analyze the following emergency query and extract key information.
Your response MUST be a valid JSON object with EXACTLY these fields and no additional text:
{{
    "location": "Geographic location mentioned (be as specific as possible, or null if none)",
    "coordinates": {{
        "latitude": "latitude if explicitly mentioned (or null)",
        "longitude": "longitude if explicitly mentioned (or null)"
    }},
    "location_confidence": Number between 0-1 indicating confidence in location detection,
    "needs_location_prompt": Boolean true if location is missing, vague or needed for proper response,
    "crisis_type": "Type of emergency or disaster (flood, fire, earthquake, etc.)",
    "urgency_level": "high", "medium", or "low",
    "specific_requests": ["List of specific things being requested"],
    "needs_medical": Boolean true if medical assistance is needed,
    "needs_evacuation": Boolean true if evacuation assistance is needed,
    "needs_supplies": Boolean true if food/water/supplies are needed,
    "has_dependents": Boolean true if query mentions children, elderly, or others who need help,
    "extracted_keywords": ["List of key terms extracted from the query"],
    "potential_resources_needed": ["List of resources that might be needed based on the crisis"]
}}

Query: "{}"

JSON Response:"#,
        query
    )
}

/// The model's view of a query. Every field is optional and coerced.
#[derive(Debug, Default, Deserialize)]
struct AnalysisReply {
    #[serde(default, deserialize_with = "lenient::text")]
    location: Option<String>,
    #[serde(default, deserialize_with = "coordinates")]
    coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient::number")]
    location_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    needs_location_prompt: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    crisis_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    urgency_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    specific_requests: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    needs_medical: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    needs_evacuation: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    needs_supplies: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    has_dependents: Option<bool>,
    #[serde(default, deserialize_with = "lenient::strings")]
    extracted_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    potential_resources_needed: Vec<String>,
}

impl AnalysisReply {
    fn into_query_info(self, query: &str) -> QueryInfo {
        let mut info = QueryInfo::blank(query, Tier::Remote);

        info.needs_location_prompt = self
            .needs_location_prompt
            .unwrap_or(self.location.is_none());
        info.location = self.location;
        info.coordinates = self.coordinates;
        info.location_confidence = self.location_confidence.unwrap_or(0.0) as f32;
        info.crisis_type = self
            .crisis_type
            .as_deref()
            .map(CrisisType::from_label)
            .unwrap_or(CrisisType::Unknown);
        info.urgency_level = self
            .urgency_level
            .as_deref()
            .map(UrgencyLevel::from_label)
            .unwrap_or(UrgencyLevel::High);
        info.specific_requests = self.specific_requests;
        info.needs_medical = self.needs_medical.unwrap_or(false);
        info.needs_evacuation = self.needs_evacuation.unwrap_or(false);
        info.needs_supplies = self.needs_supplies.unwrap_or(false);
        info.has_dependents = self.has_dependents.unwrap_or(false);
        info.extracted_keywords = self.extracted_keywords;
        info.potential_resources_needed = self.potential_resources_needed;
        info
    }
}

/// `{"latitude": .., "longitude": ..}` with numbers or numeric strings;
/// anything else is no coordinates.
fn coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = |v: Option<&Value>| match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    Ok(value.and_then(|v| {
        let latitude = number(v.get("latitude").or_else(|| v.get("lat")))?;
        let longitude = number(v.get("longitude").or_else(|| v.get("lon")))?;
        Some(Coordinates::new(latitude, longitude))
    }))
}

/// Rule-based analysis. Pure and infallible.
pub fn analyze_locally(query: &str) -> QueryInfo {
    let lower = query.to_lowercase();
    let mut info = QueryInfo::blank(query, Tier::Local);

    if let Some(location) = local_location(query) {
        debug!(location = %location, "Location matched locally");
        info.location = Some(location);
        info.location_confidence = LOCAL_LOCATION_CONFIDENCE;
        info.needs_location_prompt = false;
    }

    info.crisis_type = local_crisis(query);

    if mentions_any(&lower, keywords::MEDICAL_NEEDS) {
        info.needs_medical = true;
        info.extracted_keywords.push("medical".to_string());
        info.potential_resources_needed
            .push("medical assistance".to_string());
    }

    if mentions_any(&lower, keywords::EVACUATION_NEEDS) {
        info.needs_evacuation = true;
        info.extracted_keywords.push("evacuation".to_string());
        info.potential_resources_needed
            .push("evacuation assistance".to_string());
    }

    if mentions_any(&lower, keywords::SUPPLY_NEEDS) {
        info.needs_supplies = true;
        info.extracted_keywords.push("supplies".to_string());
        info.potential_resources_needed
            .extend(["food", "water", "shelter"].map(String::from));
    }

    if mentions_any(&lower, keywords::DEPENDENTS) {
        info.has_dependents = true;
        info.extracted_keywords.push("dependents".to_string());
    }

    info.urgency_level = if mentions_any(&lower, keywords::HIGH_URGENCY) {
        UrgencyLevel::High
    } else if mentions_any(&lower, keywords::MEDIUM_URGENCY) {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    };

    info.finalize()
}

/// Crisis type from the keyword tables alone.
pub fn local_crisis(query: &str) -> CrisisType {
    let lower = query.to_lowercase();
    keywords::CRISIS
        .iter()
        .find(|(_, words)| mentions_any(&lower, words))
        .map(|(crisis, _)| *crisis)
        .unwrap_or(CrisisType::Unknown)
}

/// The analyzed crisis type, or a keyword guess from the query when the
/// analysis had none.
pub fn crisis_or_guess(info: &QueryInfo) -> CrisisType {
    match info.crisis_type {
        CrisisType::Unknown => local_crisis(&info.original_query),
        known => known,
    }
}

/// First location pattern that matches, tidied.
fn local_location(query: &str) -> Option<String> {
    LOCATION_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(query)?;
        let first = tidy(caps.get(1)?.as_str())?;
        match caps.get(2).and_then(|m| tidy(m.as_str())) {
            Some(second) => Some(format!("{}, {}", first, second)),
            None => Some(first),
        }
    })
}

fn tidy(raw: &str) -> Option<String> {
    let trimmed = LEADING_ARTICLE.replace(raw.trim(), "");
    let trimmed = trimmed.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{MockAI, TestDependencies};

    #[test]
    fn test_local_location_patterns() {
        assert_eq!(
            analyze_locally("Flooding in Austin, Texas and we need help").location.as_deref(),
            Some("Austin, Texas")
        );
        assert_eq!(
            analyze_locally("We are trapped at 123 Main Street").location.as_deref(),
            Some("123 Main Street")
        );
        assert_eq!(
            analyze_locally("there is a fire near me").location.as_deref(),
            Some("me")
        );
        assert_eq!(
            analyze_locally("Power is out across the Manhattan area").location.as_deref(),
            Some("Manhattan")
        );
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        // "what" and "nearly" must not trigger the at/near patterns
        let info = analyze_locally("what should I do, it is nearly dark");
        assert_eq!(info.location, None);
        assert!(info.needs_location_prompt);
        assert_eq!(info.location_confidence, 0.0);
    }

    #[test]
    fn test_local_location_confidence() {
        let info = analyze_locally("fire near Central Park");
        assert_eq!(info.location_confidence, LOCAL_LOCATION_CONFIDENCE);
        assert!(!info.needs_location_prompt);
        assert_eq!(info.source, Tier::Local);
        assert!(info.processed);
    }

    #[test]
    fn test_crisis_priority() {
        assert_eq!(analyze_locally("water rising fast").crisis_type, CrisisType::Flood);
        assert_eq!(analyze_locally("smoke everywhere").crisis_type, CrisisType::Fire);
        assert_eq!(analyze_locally("a twister touched down").crisis_type, CrisisType::Tornado);
        assert_eq!(analyze_locally("he is bleeding").crisis_type, CrisisType::Medical);
        assert_eq!(analyze_locally("we are stuck").crisis_type, CrisisType::General);
        assert_eq!(analyze_locally("what time is it").crisis_type, CrisisType::Unknown);
        // flood outranks fire when both appear
        assert_eq!(analyze_locally("fire and flood").crisis_type, CrisisType::Flood);
    }

    #[test]
    fn test_needs_flags() {
        let info = analyze_locally("my baby is hurt and we need food, must evacuate");
        assert!(info.needs_medical);
        assert!(info.needs_evacuation);
        assert!(info.needs_supplies);
        assert!(info.has_dependents);
        assert_eq!(
            info.extracted_keywords,
            vec!["medical", "evacuation", "supplies", "dependents"]
        );
        assert!(info.potential_resources_needed.contains(&"shelter".to_string()));
    }

    #[test]
    fn test_urgency_ladder() {
        assert_eq!(analyze_locally("I need help, trapped").urgency_level, UrgencyLevel::High);
        assert_eq!(analyze_locally("I am worried").urgency_level, UrgencyLevel::Medium);
        assert_eq!(analyze_locally("what is the forecast").urgency_level, UrgencyLevel::Low);
    }

    #[tokio::test]
    async fn test_remote_analysis_is_decoded_and_normalized() {
        let ai = MockAI::new().with_response(
            r#"```json
            {"location": "Houston, TX", "coordinates": {"latitude": "29.76", "longitude": -95.37},
             "location_confidence": "0.9", "needs_location_prompt": false,
             "crisis_type": "Flash flooding", "urgency_level": "HIGH",
             "needs_medical": "yes", "specific_requests": "boat rescue"}
            ```"#,
        );
        let deps = TestDependencies::new().mock_ai(ai);

        let info = analyze("water in our house in Houston", &deps.deps()).await;

        assert_eq!(info.source, Tier::Remote);
        assert_eq!(info.location.as_deref(), Some("Houston, TX"));
        assert_eq!(info.coordinates, Some(Coordinates::new(29.76, -95.37)));
        assert_eq!(info.crisis_type, CrisisType::Flood);
        assert!(info.needs_medical);
        assert_eq!(info.specific_requests, vec!["boat rescue"]);
        assert!(!info.needs_location_prompt);
    }

    #[tokio::test]
    async fn test_remote_null_location_forces_prompt() {
        let ai = MockAI::new().with_response(
            r#"{"location": "null", "location_confidence": 0.95, "needs_location_prompt": false}"#,
        );
        let deps = TestDependencies::new().mock_ai(ai);

        let info = analyze("help", &deps.deps()).await;

        assert_eq!(info.location, None);
        assert!(info.needs_location_prompt);
    }

    #[tokio::test]
    async fn test_unreadable_reply_falls_back_to_local() {
        let deps = TestDependencies::new().mock_ai(MockAI::new().with_response("I'm not sure."));

        let info = analyze("flood near Miami", &deps.deps()).await;

        assert_eq!(info.source, Tier::Local);
        assert_eq!(info.location.as_deref(), Some("Miami"));
        assert_eq!(info.crisis_type, CrisisType::Flood);
    }

    #[tokio::test]
    async fn test_failed_call_falls_back_to_local() {
        let deps = TestDependencies::new();

        let info = analyze("earthquake", &deps.deps()).await;

        assert_eq!(info.source, Tier::Local);
        assert!(info.needs_location_prompt);
        assert!(deps
            .progress
            .messages_from(PROGRESS_SOURCE)
            .contains(&"Falling back to local query processing.".to_string()));
    }
}
