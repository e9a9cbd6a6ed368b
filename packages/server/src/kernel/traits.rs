// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no triage logic.
// Triage logic (like "classify intent") lives in domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseWeatherService)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference client misconfigured: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("inference API error: {0}")]
    Api(String),

    #[error("inference call timed out")]
    Timeout,

    #[error("no inference backend configured")]
    Unavailable,
}

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> std::result::Result<String, InferenceError>;

    /// Complete a prompt expecting a JSON object back.
    /// Parse with StructuredReply in calling code
    async fn complete_json(&self, prompt: &str) -> std::result::Result<String, InferenceError> {
        if prompt.contains("JSON") || prompt.contains("json") {
            self.complete(prompt).await
        } else {
            self.complete(&format!("{}\n\nPlease respond with a valid JSON object.", prompt))
                .await
        }
    }
}

// =============================================================================
// Geographic data providers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and on the globe.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub kind: String,
    pub severity: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherReport {
    pub alerts: Vec<WeatherAlert>,
    /// Period label ("next_24_hours", ...) to summary text
    pub forecast: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardDetection {
    pub latitude: f64,
    pub longitude: f64,
    pub confidence: Option<String>,
    pub detected_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardReport {
    pub detections: Vec<HazardDetection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelter {
    pub name: String,
    pub address: String,
    pub status: String,
    pub amenities: Vec<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvacuationRoute {
    pub name: String,
    pub status: String,
    pub description: String,
    pub closure_points: Vec<String>,
}

#[async_trait]
pub trait BaseWeatherService: Send + Sync {
    async fn alerts(&self, at: Coordinates) -> Result<WeatherReport>;
}

#[async_trait]
pub trait BaseHazardService: Send + Sync {
    /// Active fire/hazard detections near a point
    async fn detections(&self, at: Coordinates) -> Result<HazardReport>;
}

#[async_trait]
pub trait BaseShelterService: Send + Sync {
    async fn shelters(&self, at: Coordinates) -> Result<Vec<Shelter>>;
}

#[async_trait]
pub trait BaseRouteService: Send + Sync {
    async fn evacuation_routes(&self, at: Coordinates) -> Result<Vec<EvacuationRoute>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(29.7604, -95.3698).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
