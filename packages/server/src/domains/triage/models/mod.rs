pub mod intent;
pub mod query_info;
pub mod response;

use serde::Serialize;

pub use intent::{Intent, IntentDecision};
pub use query_info::{CrisisType, QueryInfo, UrgencyLevel, MIN_LOCATION_CONFIDENCE};
pub use response::{AgentResponse, InfoType};

/// Which tier produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Remote,
    Local,
}

impl Tier {
    pub fn is_local(&self) -> bool {
        matches!(self, Tier::Local)
    }
}
