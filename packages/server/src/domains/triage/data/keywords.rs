//! Keyword tables for the local tiers.
//!
//! Matching is plain substring search over the lowercased query, so "help"
//! also fires on "helpless".

use crate::domains::triage::models::CrisisType;

/// Checked in order; the first set with a hit decides the crisis type.
pub const CRISIS: &[(CrisisType, &[&str])] = &[
    (CrisisType::Flood, &["flood", "flooding", "water rising", "submerged"]),
    (CrisisType::Fire, &["fire", "burning", "flames", "smoke", "wildfire"]),
    (CrisisType::Earthquake, &["earthquake", "tremor", "shaking", "quake"]),
    (CrisisType::Hurricane, &["hurricane", "cyclone", "storm", "typhoon"]),
    (CrisisType::Tornado, &["tornado", "twister", "funnel cloud"]),
    (
        CrisisType::Medical,
        &["injured", "hurt", "medical", "bleeding", "wound", "heart attack", "stroke"],
    ),
    (
        CrisisType::General,
        &["emergency", "help", "danger", "disaster", "trapped", "stuck"],
    ),
];

pub const MEDICAL_NEEDS: &[&str] = &[
    "medical", "ambulance", "doctor", "nurse", "injured", "hurt", "wound", "bleeding", "pain",
];

pub const EVACUATION_NEEDS: &[&str] = &["evacuate", "evacuation", "leave", "escape", "flee", "get out"];

pub const SUPPLY_NEEDS: &[&str] = &["water", "food", "supplies", "blankets", "shelter", "clothing"];

pub const DEPENDENTS: &[&str] = &[
    "child", "children", "baby", "elderly", "disabled", "pet", "dog", "cat",
];

pub const HIGH_URGENCY: &[&str] = &[
    "immediately",
    "emergency",
    "urgent",
    "critical",
    "life-threatening",
    "danger",
    "dying",
    "trapped",
];

pub const MEDIUM_URGENCY: &[&str] = &["soon", "worried", "concerned", "help", "assistance", "need"];

pub const RESCUE_INTENT: &[&str] = &[
    "help", "emergency", "trapped", "hurt", "injured", "danger", "save", "rescue",
];

pub const RESOURCE_INTENT: &[&str] = &[
    "where", "location", "find", "need", "supplies", "resource", "contact", "shelter",
];

pub const WEATHER_INFO: &[&str] = &["weather", "forecast", "flood", "rain", "storm", "alert"];

pub const EVACUATION_INFO: &[&str] = &["evacuation", "evacuate", "route", "road", "path", "escape"];

pub const SHELTER_INFO: &[&str] = &["shelter", "safe", "safety", "camp", "stay"];

pub fn mentions_any(lowercase_text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| lowercase_text.contains(w))
}
