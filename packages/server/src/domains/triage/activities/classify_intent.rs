//! Intent classification: rescue, resource or information.

use serde::Deserialize;
use tracing::{info, warn};

use crate::common::{lenient, StructuredReply};
use crate::domains::triage::data::keywords::{self, mentions_any};
use crate::domains::triage::models::{Intent, IntentDecision, QueryInfo, Tier};
use crate::kernel::{bounded, TriageDeps};

use super::analyze_query::PROGRESS_SOURCE;

/// Confidence reported by the keyword ladder.
pub const LOCAL_CONFIDENCE: u8 = 70;

/// Classify a query, remotely if possible.
pub async fn classify(query: &str, query_info: &QueryInfo, deps: &TriageDeps) -> IntentDecision {
    let prompt = build_intent_prompt(query, query_info);
    let reply = bounded(
        "inference",
        deps.settings.collaborator_timeout,
        deps.ai.complete_json(&prompt),
    )
    .await;

    let decision = match reply {
        Ok(raw) => match decode_decision(&raw) {
            Some(decision) => decision,
            None => {
                warn!("Intent reply unusable, classifying locally");
                deps.progress.notify(
                    PROGRESS_SOURCE,
                    "Warning: Could not parse intent classification. Using local intent classification.",
                );
                classify_locally(query)
            }
        },
        Err(e) => {
            deps.progress.notify(
                PROGRESS_SOURCE,
                &format!(
                    "Intent classification API error: {}. Using local intent classification.",
                    e
                ),
            );
            classify_locally(query)
        }
    };

    info!(
        intent = %decision.intent,
        confidence = decision.confidence,
        source = ?decision.source,
        "Intent classified"
    );
    deps.progress.notify(
        PROGRESS_SOURCE,
        &format!(
            "Intent classified as {} with {}% confidence.",
            decision.intent.as_str().to_uppercase(),
            decision.confidence
        ),
    );

    decision
}

fn build_intent_prompt(query: &str, query_info: &QueryInfo) -> String {
    format!(
        r#"Analyze the following emergency query and classify its primary intent as one of these categories.
Return your answer as a JSON object with the following structure:
{{
    "intent": "rescue|resource|information",
    "confidence": 0-100,
    "reasoning": "brief explanation of classification"
}}

Where:
- "rescue": User needs immediate life-saving assistance
- "resource": User needs to locate specific resources/contacts
- "information": User is seeking general information or status updates

Query: "{}"
Location: {}
Crisis Type: {}

JSON Response:"#,
        query,
        query_info.location.as_deref().unwrap_or("Unknown"),
        query_info.crisis_type
    )
}

#[derive(Debug, Deserialize)]
struct IntentReply {
    #[serde(default, deserialize_with = "lenient::text")]
    intent: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    reasoning: Option<String>,
}

/// A decision only when the reply names one of the three intents.
fn decode_decision(raw: &str) -> Option<IntentDecision> {
    let reply: IntentReply = StructuredReply::parse(raw).decode().ok()?;
    let intent = Intent::from_label(reply.intent.as_deref()?)?;

    let confidence = reply
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(50);

    Some(IntentDecision {
        intent,
        confidence,
        reasoning: reply
            .reasoning
            .unwrap_or_else(|| format!("Classified as {} by the remote model", intent)),
        source: Tier::Remote,
    })
}

/// The keyword ladder: rescue words, then resource words, else information.
pub fn local_intent(query: &str) -> Intent {
    let lower = query.to_lowercase();
    if mentions_any(&lower, keywords::RESCUE_INTENT) {
        Intent::Rescue
    } else if mentions_any(&lower, keywords::RESOURCE_INTENT) {
        Intent::Resource
    } else {
        Intent::Information
    }
}

pub fn classify_locally(query: &str) -> IntentDecision {
    let intent = local_intent(query);
    let reasoning = match intent {
        Intent::Rescue => "Local classification based on emergency keywords",
        Intent::Resource => "Local classification based on resource keywords",
        _ => "Local classification defaulting to information",
    };

    IntentDecision {
        intent,
        confidence: LOCAL_CONFIDENCE,
        reasoning: reasoning.to_string(),
        source: Tier::Local,
    }
}
