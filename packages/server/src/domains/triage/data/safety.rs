//! Per-crisis safety guidance.

use crate::domains::triage::models::CrisisType;

const FLOOD: &[&str] = &[
    "Move to higher ground immediately",
    "Do not walk through moving water",
    "Do not drive through flooded areas",
    "Follow evacuation orders from authorities",
];

const FIRE: &[&str] = &[
    "Evacuate immediately if authorities order it",
    "Cover nose and mouth with a wet cloth",
    "Test doorknobs and spaces around doors before opening",
    "Use stairs instead of elevators",
    "If trapped, signal for help from a window",
];

const EARTHQUAKE: &[&str] = &[
    "Drop, cover, and hold on",
    "If indoors, stay away from windows",
    "If outdoors, move to a clear area away from buildings",
    "After shaking stops, check for injuries and damage",
    "Be prepared for aftershocks",
];

const HURRICANE: &[&str] = &[
    "Follow evacuation orders from local authorities",
    "Secure your home and property",
    "Have emergency supplies ready",
    "Stay indoors during the storm",
    "Avoid flooded areas during and after the storm",
];

const TORNADO: &[&str] = &[
    "Seek shelter in a basement or interior room on the lowest floor",
    "Stay away from windows and outside walls",
    "Cover your head and neck with arms",
    "If caught outside, lie flat in a nearby ditch or depression",
    "Do not try to outrun a tornado in a vehicle",
];

const GENERAL: &[&str] = &[
    "Call 911 for immediate life-threatening emergencies",
    "Follow instructions from local authorities",
    "Have emergency supplies prepared",
    "Stay informed through official channels",
    "Help others if you can do so safely",
];

pub const RECOMMENDED_SHELTER: &str = "Contact local authorities for shelter locations. \
     If evacuation is necessary, bring emergency supplies including water, food, \
     medications, and important documents.";

pub const CLOSING_ADVICE: &str =
    "Follow instructions from local authorities and stay connected to emergency broadcasts.";

pub const GENERAL_SAFETY_RECOMMENDATION: &str = "Please follow all instructions from local \
     authorities and stay tuned to official communication channels for updates.";

/// Instructions for a crisis type. Types without their own table get the
/// general list.
pub fn safety_instructions(crisis: CrisisType) -> &'static [&'static str] {
    match crisis {
        CrisisType::Flood => FLOOD,
        CrisisType::Fire => FIRE,
        CrisisType::Earthquake => EARTHQUAKE,
        CrisisType::Hurricane => HURRICANE,
        CrisisType::Tornado => TORNADO,
        CrisisType::Medical | CrisisType::General | CrisisType::Unknown => GENERAL,
    }
}

/// One-paragraph warning naming the crisis and place.
pub fn safety_warning(crisis: CrisisType, location: &str) -> String {
    let action = match crisis {
        CrisisType::Flood => {
            "Seek higher ground immediately. Avoid walking or driving through flood waters."
        }
        CrisisType::Fire => {
            "If ordered to evacuate, do so immediately. Keep windows and doors closed to prevent embers from entering."
        }
        CrisisType::Hurricane => {
            "Secure your property and prepare for high winds and flooding. Follow evacuation orders if issued."
        }
        CrisisType::Earthquake => {
            "Drop, cover, and hold on. Stay away from windows and exterior walls."
        }
        CrisisType::Tornado => {
            "Seek shelter in a basement or interior room on the lowest floor. Stay away from windows."
        }
        CrisisType::Medical | CrisisType::General | CrisisType::Unknown => {
            "Follow instructions from local authorities and stay tuned to emergency broadcasts."
        }
    };

    format!(
        "ATTENTION: Possible {} situation reported in {}. {}",
        crisis, location, action
    )
}

/// `1. first\n2. second\n...`
pub fn numbered(instructions: &[&str]) -> String {
    instructions
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}
