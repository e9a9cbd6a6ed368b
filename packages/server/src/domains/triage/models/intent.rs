use serde::{Deserialize, Serialize};
use std::fmt;

use super::Tier;

/// Which specialist answers the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Immediate life-safety assistance
    Rescue,
    /// Locating specific resources or contacts
    Resource,
    /// General information or status updates
    Information,
    /// Waiting for the user to say where they are
    PendingLocation,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Rescue => "rescue",
            Intent::Resource => "resource",
            Intent::Information => "information",
            Intent::PendingLocation => "pending_location",
        }
    }

    /// One of the three routable intents, or None.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "rescue" => Some(Intent::Rescue),
            "resource" | "resources" => Some(Intent::Resource),
            "information" | "info" => Some(Intent::Information),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentDecision {
    pub intent: Intent,
    /// 0 to 100
    pub confidence: u8,
    pub reasoning: String,
    pub source: Tier,
}
