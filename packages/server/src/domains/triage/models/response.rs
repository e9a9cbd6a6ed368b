use serde::Serialize;
use serde_json::{Map, Value};

use super::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    RescueInformation,
    ResourceInformation,
    EmergencyInformation,
    LocationRequest,
    LocalFallback,
    FatalError,
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::RescueInformation => "rescue_information",
            InfoType::ResourceInformation => "resource_information",
            InfoType::EmergencyInformation => "emergency_information",
            InfoType::LocationRequest => "location_request",
            InfoType::LocalFallback => "local_fallback",
            InfoType::FatalError => "fatal_error",
        }
    }
}

/// The one shape every query ends in.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub response_text: String,
    pub structured_data: Map<String, Value>,
    pub info_type: InfoType,
    pub intent: Option<Intent>,
    /// Some step on the way used a local tier
    pub used_local_fallback: bool,
    pub is_error: bool,
}

impl AgentResponse {
    pub fn new(info_type: InfoType, response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            structured_data: Map::new(),
            info_type,
            intent: None,
            used_local_fallback: false,
            is_error: false,
        }
    }

    /// Merge the fields of a JSON object into `structured_data`. Non-object
    /// values land under `"data"`.
    pub fn with_data(mut self, data: Value) -> Self {
        match data {
            Value::Object(map) => self.structured_data.extend(map),
            other => {
                self.structured_data.insert("data".to_string(), other);
            }
        }
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn local(mut self, used_local_fallback: bool) -> Self {
        self.used_local_fallback = used_local_fallback;
        self
    }
}
