use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Tier;
use crate::kernel::Coordinates;

/// Below this the location is treated as a guess and the user is asked.
pub const MIN_LOCATION_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisType {
    Flood,
    Fire,
    Earthquake,
    Hurricane,
    Tornado,
    Medical,
    General,
    Unknown,
}

impl CrisisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisType::Flood => "flood",
            CrisisType::Fire => "fire",
            CrisisType::Earthquake => "earthquake",
            CrisisType::Hurricane => "hurricane",
            CrisisType::Tornado => "tornado",
            CrisisType::Medical => "medical",
            CrisisType::General => "general",
            CrisisType::Unknown => "unknown",
        }
    }

    /// Map a free-form label from a model reply, synonyms included.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

        if has(&["flood", "inundation", "flash water"]) {
            CrisisType::Flood
        } else if has(&["fire", "blaze", "smoke"]) {
            CrisisType::Fire
        } else if has(&["earthquake", "quake", "tremor", "seismic"]) {
            CrisisType::Earthquake
        } else if has(&["hurricane", "cyclone", "typhoon", "storm"]) {
            CrisisType::Hurricane
        } else if has(&["tornado", "twister"]) {
            CrisisType::Tornado
        } else if has(&["medical", "injur", "health", "cardiac", "overdose"]) {
            CrisisType::Medical
        } else if has(&["general", "emergency", "disaster"]) {
            CrisisType::General
        } else {
            CrisisType::Unknown
        }
    }
}

impl fmt::Display for CrisisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::High => "high",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::Low => "low",
        }
    }

    /// Unrecognized labels err on the side of urgency.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "medium" | "moderate" => UrgencyLevel::Medium,
            "low" => UrgencyLevel::Low,
            _ => UrgencyLevel::High,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the analyzer understood about a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryInfo {
    pub original_query: String,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// 0.0 to 1.0
    pub location_confidence: f32,
    pub needs_location_prompt: bool,
    pub crisis_type: CrisisType,
    pub urgency_level: UrgencyLevel,
    pub needs_medical: bool,
    pub needs_evacuation: bool,
    pub needs_supplies: bool,
    pub has_dependents: bool,
    pub specific_requests: Vec<String>,
    pub extracted_keywords: Vec<String>,
    pub potential_resources_needed: Vec<String>,
    pub processed: bool,
    pub timestamp: DateTime<Utc>,
    pub source: Tier,
}

impl QueryInfo {
    /// Nothing understood yet. Both analysis tiers start from here.
    pub fn blank(query: &str, source: Tier) -> Self {
        Self {
            original_query: query.to_string(),
            location: None,
            coordinates: None,
            location_confidence: 0.0,
            needs_location_prompt: true,
            crisis_type: CrisisType::Unknown,
            urgency_level: UrgencyLevel::High,
            needs_medical: false,
            needs_evacuation: false,
            needs_supplies: false,
            has_dependents: false,
            specific_requests: Vec::new(),
            extracted_keywords: Vec::new(),
            potential_resources_needed: Vec::new(),
            processed: false,
            timestamp: Utc::now(),
            source,
        }
    }

    /// Final step of either tier: clean the location, clamp confidence,
    /// enforce the prompt rule and stamp processing metadata.
    pub fn finalize(mut self) -> Self {
        self.location = self.location.take().and_then(|raw| {
            let trimmed = raw.trim();
            let placeholder = ["null", "none", "unknown", "n/a"]
                .iter()
                .any(|p| trimmed.eq_ignore_ascii_case(p));
            (!trimmed.is_empty() && !placeholder).then(|| trimmed.to_string())
        });

        self.location_confidence = if self.location_confidence.is_finite() {
            self.location_confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.coordinates = self.coordinates.filter(|c| c.is_valid());

        if self.location.is_none() || self.location_confidence < MIN_LOCATION_CONFIDENCE {
            self.needs_location_prompt = true;
        }

        self.processed = true;
        self.timestamp = Utc::now();
        self
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }

    /// The analyzer has no location and wants to ask for one.
    pub fn awaiting_location(&self) -> bool {
        self.needs_location_prompt && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_requires_prompt_without_location() {
        let mut info = QueryInfo::blank("help", Tier::Remote);
        info.needs_location_prompt = false;
        info.location = Some("  null ".to_string());
        info.location_confidence = 0.9;

        let info = info.finalize();
        assert_eq!(info.location, None);
        assert!(info.needs_location_prompt);
        assert!(info.awaiting_location());
        assert!(info.processed);
    }

    #[test]
    fn test_finalize_low_confidence_keeps_location_but_prompts() {
        let mut info = QueryInfo::blank("flood in houston", Tier::Remote);
        info.needs_location_prompt = false;
        info.location = Some("Houston".to_string());
        info.location_confidence = 0.3;

        let info = info.finalize();
        assert_eq!(info.location.as_deref(), Some("Houston"));
        assert!(info.needs_location_prompt);
        assert!(!info.awaiting_location());
    }

    #[test]
    fn test_finalize_clamps_confidence() {
        let mut info = QueryInfo::blank("q", Tier::Remote);
        info.location = Some("Miami".to_string());
        info.location_confidence = 7.0;
        assert_eq!(info.finalize().location_confidence, 1.0);

        let mut info = QueryInfo::blank("q", Tier::Remote);
        info.location_confidence = f32::NAN;
        assert_eq!(info.finalize().location_confidence, 0.0);
    }

    #[test]
    fn test_crisis_labels() {
        assert_eq!(CrisisType::from_label("Flash Flooding"), CrisisType::Flood);
        assert_eq!(CrisisType::from_label("wildfire"), CrisisType::Fire);
        assert_eq!(CrisisType::from_label("Tropical Cyclone"), CrisisType::Hurricane);
        assert_eq!(CrisisType::from_label("volcano"), CrisisType::Unknown);
    }

    #[test]
    fn test_urgency_labels() {
        assert_eq!(UrgencyLevel::from_label("LOW"), UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::from_label("moderate"), UrgencyLevel::Medium);
        assert_eq!(UrgencyLevel::from_label("???"), UrgencyLevel::High);
    }
}
