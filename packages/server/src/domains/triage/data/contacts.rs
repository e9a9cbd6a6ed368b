//! Directory of well-known emergency numbers.

use serde::Serialize;

use super::keywords::mentions_any;
use crate::domains::triage::models::CrisisType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryContact {
    pub name: &'static str,
    pub number: &'static str,
}

pub const GENERAL: DirectoryContact = DirectoryContact {
    name: "Emergency Services",
    number: "911",
};

pub const POLICE: DirectoryContact = DirectoryContact {
    name: "Police Department",
    number: "911",
};

pub const FIRE: DirectoryContact = DirectoryContact {
    name: "Fire Department",
    number: "911",
};

pub const MEDICAL: DirectoryContact = DirectoryContact {
    name: "Emergency Medical Services",
    number: "911",
};

pub const POISON: DirectoryContact = DirectoryContact {
    name: "Poison Control",
    number: "1-800-222-1222",
};

pub const DISASTER: DirectoryContact = DirectoryContact {
    name: "FEMA Helpline",
    number: "1-800-621-3362",
};

pub const CRISIS: DirectoryContact = DirectoryContact {
    name: "Crisis Text Line",
    number: "Text HOME to 741741",
};

impl DirectoryContact {
    /// `- Name: number`
    pub fn line(&self) -> String {
        format!("- {}: {}", self.name, self.number)
    }
}

/// Directory entries for a resource request: one primary service picked by
/// crisis and medical need, plus specialist lines the query asks about.
pub fn directory_for(query: &str, needs_medical: bool, crisis: CrisisType) -> Vec<DirectoryContact> {
    let lower = query.to_lowercase();

    let mut directory = vec![if crisis == CrisisType::Fire {
        FIRE
    } else if needs_medical || crisis == CrisisType::Medical {
        MEDICAL
    } else {
        GENERAL
    }];

    if mentions_any(&lower, &["poison"]) {
        directory.push(POISON);
    }
    if mentions_any(&lower, &["disaster", "fema"]) {
        directory.push(DISASTER);
    }
    if mentions_any(&lower, &["crisis", "mental", "suicide"]) {
        directory.push(CRISIS);
    }

    directory
}
