//! Briefs: what a handler tells the user.
//!
//! The remote tier asks the model to synthesize a JSON brief from collected
//! data. The local tier assembles the same shape from the data and the
//! static safety tables. Both end up rendered by the handler.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::{lenient, StructuredReply};
use crate::kernel::{bounded, ContactMap, ContactRecord, TriageDeps};

/// Emails listed per source in locally assembled aid.
pub const MAX_EMAILS_PER_SOURCE: usize = 2;

/// Ask the model for a brief. None on any failure.
pub async fn request_brief<T: DeserializeOwned>(prompt: &str, deps: &TriageDeps) -> Option<T> {
    let raw = bounded(
        "inference",
        deps.settings.collaborator_timeout,
        deps.ai.complete_json(prompt),
    )
    .await
    .ok()?;

    match StructuredReply::parse(&raw).decode() {
        Ok(brief) => Some(brief),
        Err(e) => {
            warn!(error = %e, "Unreadable brief, assembling locally");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidContact {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl AidContact {
    fn new(kind: &str, value: &str) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }

    /// `emergency_phone` -> `EMERGENCY PHONE`
    pub fn label(&self) -> String {
        self.kind.replace('_', " ").to_uppercase()
    }
}

/// Contacts grouped under the source they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidSource {
    pub name: String,
    pub contacts: Vec<AidContact>,
}

/// Emergency phones, phones, then a couple of emails for every source that
/// was fetched and had any of them.
pub fn contactable_aid(contacts: &ContactMap, title_for: impl Fn(&str) -> String) -> Vec<AidSource> {
    contacts
        .iter()
        .filter_map(|(url, outcome)| {
            let record = outcome.record()?;
            let entry = AidSource {
                name: title_for(url),
                contacts: aid_contacts(record),
            };
            (!entry.contacts.is_empty()).then_some(entry)
        })
        .collect()
}

fn aid_contacts(record: &ContactRecord) -> Vec<AidContact> {
    let emergency = record
        .emergency_phones()
        .iter()
        .map(|p| AidContact::new("emergency_phone", p));
    let phones = record.phones().iter().map(|p| AidContact::new("phone", p));
    let emails = record
        .emails()
        .iter()
        .take(MAX_EMAILS_PER_SOURCE)
        .map(|e| AidContact::new("email", e));

    emergency.chain(phones).chain(emails).collect()
}

/// `\n{name}:\n- LABEL: value` blocks, or a single line when empty.
pub fn render_aid(aid: &[AidSource]) -> String {
    if aid.is_empty() {
        return "No specific contact information available.".to_string();
    }

    let mut lines = Vec::new();
    for source in aid {
        lines.push(format!("\n{}:", source.name));
        for contact in &source.contacts {
            lines.push(format!("- {}: {}", contact.label(), contact.value));
        }
    }
    lines.join("\n")
}

/// Lenient list of aid sources. Entries may carry `contacts` as
/// `{type, value}` objects or bare strings; anything unusable is dropped.
fn aid_list<'de, D>(deserializer: D) -> Result<Vec<AidSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(item @ Value::Object(_)) => vec![item],
        _ => return Ok(Vec::new()),
    };

    Ok(items.into_iter().filter_map(aid_source).collect())
}

fn aid_source(item: Value) -> Option<AidSource> {
    let text = |v: &Value| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    let name = item
        .get("name")
        .or_else(|| item.get("source"))
        .and_then(text)
        .unwrap_or_else(|| "Unknown Source".to_string());

    let contacts: Vec<AidContact> = match item.get("contacts") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(_) => Some(AidContact {
                    kind: entry
                        .get("type")
                        .and_then(text)
                        .unwrap_or_else(|| "contact".to_string()),
                    value: entry.get("value").and_then(text)?,
                }),
                other => text(other).map(|value| AidContact {
                    kind: "contact".to_string(),
                    value,
                }),
            })
            .collect(),
        _ => ["phone", "emergency_phone", "email", "contact"]
            .iter()
            .filter_map(|key| {
                item.get(*key)
                    .and_then(text)
                    .map(|value| AidContact::new(key, &value))
            })
            .collect(),
    };

    if contacts.is_empty() {
        debug!(source = %name, "Dropping aid entry without contacts");
        return None;
    }
    Some(AidSource { name, contacts })
}

/// Rescue brief.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TriageBrief {
    #[serde(default, deserialize_with = "lenient::text")]
    pub safety_warning: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recommended_shelter: Option<String>,
    #[serde(default, deserialize_with = "aid_list")]
    pub contactable_aid: Vec<AidSource>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub safety_instructions: Vec<String>,
}

/// Resource brief.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResourceBrief {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "aid_list")]
    pub contactable_aid: Vec<AidSource>,
}

/// Information brief.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InformationBrief {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub safety_recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{ContactOutcome, ErrorTag};

    fn record(emergency: &[&str], phones: &[&str], emails: &[&str]) -> ContactRecord {
        ContactRecord::new(
            emergency.iter().map(|s| s.to_string()),
            phones.iter().map(|s| s.to_string()),
            emails.iter().map(|s| s.to_string()),
            Vec::<String>::new(),
        )
    }

    #[test]
    fn test_contactable_aid_skips_failed_and_empty() {
        let mut contacts = ContactMap::new();
        contacts.insert(
            "https://county.gov".to_string(),
            ContactOutcome::Found {
                record: record(
                    &["911"],
                    &["5551234567"],
                    &["a@county.gov", "b@county.gov", "c@county.gov"],
                ),
            },
        );
        contacts.insert(
            "https://down.example".to_string(),
            ContactOutcome::Failed {
                error: ErrorTag {
                    kind: "timeout".to_string(),
                    message: "timeout fetching".to_string(),
                },
            },
        );
        contacts.insert(
            "https://empty.example".to_string(),
            ContactOutcome::Found {
                record: ContactRecord::empty(),
            },
        );

        let aid = contactable_aid(&contacts, |url| format!("title of {}", url));

        assert_eq!(aid.len(), 1);
        assert_eq!(aid[0].name, "title of https://county.gov");
        let kinds: Vec<_> = aid[0].contacts.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["emergency_phone", "phone", "email", "email"]);
    }

    #[test]
    fn test_render_aid() {
        let aid = vec![AidSource {
            name: "County OEM".to_string(),
            contacts: vec![AidContact::new("emergency_phone", "911")],
        }];
        assert_eq!(render_aid(&aid), "\nCounty OEM:\n- EMERGENCY PHONE: 911");
        assert_eq!(render_aid(&[]), "No specific contact information available.");
    }

    #[test]
    fn test_triage_brief_tolerates_loose_shapes() {
        let brief: TriageBrief = StructuredReply::parse(
            r#"{
                "safety_warning": "Get to high ground",
                "recommended_shelter": null,
                "contactable_aid": [
                    {"name": "Red Cross", "contacts": ["1-800-733-2767"]},
                    {"name": "County", "phone": "555-0100"},
                    {"name": "Nothing here"}
                ],
                "safety_instructions": "Stay out of the water"
            }"#,
        )
        .decode()
        .unwrap();

        assert_eq!(brief.safety_warning.as_deref(), Some("Get to high ground"));
        assert!(brief.recommended_shelter.is_none());
        assert_eq!(brief.contactable_aid.len(), 2);
        assert_eq!(brief.contactable_aid[1].contacts[0].label(), "PHONE");
        assert_eq!(brief.safety_instructions, vec!["Stay out of the water"]);
    }
}
