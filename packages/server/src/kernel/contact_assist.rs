//! Model-backed second pass for pages the regex extractor came up empty on.

use async_trait::async_trait;
use contact_extraction::{
    normalize_phone, truncate_chars, AssistError, ContactAssist, ContactRecord,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::traits::{BaseAI, InferenceError};
use crate::common::{lenient, StructuredReply};

pub const DEFAULT_ASSIST_MAX_CHARS: usize = 6000;

pub struct AiContactAssist {
    ai: Arc<dyn BaseAI>,
    max_chars: usize,
}

impl AiContactAssist {
    pub fn new(ai: Arc<dyn BaseAI>) -> Self {
        Self {
            ai,
            max_chars: DEFAULT_ASSIST_MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// Accepts both the plural keys and the older singular ones.
#[derive(Debug, Default, Deserialize)]
struct AssistReply {
    #[serde(default, alias = "emergency_phone", deserialize_with = "lenient::strings")]
    emergency_phones: Vec<String>,
    #[serde(default, alias = "phone", deserialize_with = "lenient::strings")]
    phones: Vec<String>,
    #[serde(default, alias = "email", deserialize_with = "lenient::strings")]
    emails: Vec<String>,
    #[serde(default, alias = "address", deserialize_with = "lenient::strings")]
    addresses: Vec<String>,
}

impl AssistReply {
    fn into_record(self) -> ContactRecord {
        let phones = |values: Vec<String>| {
            values
                .iter()
                .map(|p| normalize_phone(p))
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        };

        ContactRecord::new(
            phones(self.emergency_phones),
            phones(self.phones),
            self.emails,
            self.addresses,
        )
    }
}

fn build_prompt(url: &str, text: &str) -> String {
    format!(
        "Analyze the following webpage content for contact information.\n\
         Explicitly look for:\n\
         - Standard phone numbers\n\
         - Emergency contact numbers (look for terms like 'emergency', 'hotline', 'urgent', '24/7', 'rescue' nearby)\n\
         - Email addresses\n\
         - Physical addresses\n\n\
         Format the output strictly as a JSON object with keys \"phones\", \"emergency_phones\", \
         \"emails\" and \"addresses\", each a list of strings. If nothing is found for a \
         category, use an empty list [].\n\
         Return ONLY the JSON object and nothing else.\n\n\
         Webpage content from {}:\n{}",
        url, text
    )
}

#[async_trait]
impl ContactAssist for AiContactAssist {
    async fn extract_contacts(&self, url: &str, text: &str) -> Result<ContactRecord, AssistError> {
        let prompt = build_prompt(url, truncate_chars(text, self.max_chars));

        let raw = self.ai.complete_json(&prompt).await.map_err(|e| match e {
            InferenceError::Unavailable => AssistError::Unavailable,
            other => AssistError::Inference(other.to_string()),
        })?;

        let reply: AssistReply = StructuredReply::parse(&raw)
            .decode()
            .map_err(|e| AssistError::Malformed(e.to_string()))?;

        let record = reply.into_record();
        if record.is_empty() {
            return Err(AssistError::Empty);
        }

        debug!(
            url = %url,
            emergency = record.emergency_phones().len(),
            phones = record.phones().len(),
            emails = record.emails().len(),
            "Assisted extraction produced contacts"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockAI;
    use crate::kernel::UnavailableAI;

    #[tokio::test]
    async fn test_plural_keys() {
        let ai = MockAI::new().with_response(
            r#"{"emergency_phones": ["(800) 555-0123"], "phones": ["612.555.0199"],
                "emails": ["help@county.gov"], "addresses": []}"#,
        );
        let assist = AiContactAssist::new(Arc::new(ai));

        let record = assist
            .extract_contacts("https://county.gov", "page text")
            .await
            .unwrap();

        assert_eq!(record.emergency_phones(), &["8005550123".to_string()]);
        assert_eq!(record.phones(), &["6125550199".to_string()]);
        assert_eq!(record.emails(), &["help@county.gov".to_string()]);
    }

    #[tokio::test]
    async fn test_legacy_singular_keys_and_overlap() {
        let ai = MockAI::new().with_response(
            "Here you go: {\"emergency_phone\": \"800-555-0123\", \"phone\": [\"800-555-0123\", \"612-555-0199\"], \"email\": []}",
        );
        let assist = AiContactAssist::new(Arc::new(ai));

        let record = assist.extract_contacts("https://a.org", "text").await.unwrap();

        assert_eq!(record.emergency_phones(), &["8005550123".to_string()]);
        assert_eq!(record.phones(), &["6125550199".to_string()]);
    }

    #[tokio::test]
    async fn test_prompt_is_truncated() {
        let ai = Arc::new(MockAI::new().with_response(r#"{"emails": ["a@b.org"]}"#));
        let assist = AiContactAssist::new(ai.clone()).with_max_chars(10);

        assist
            .extract_contacts("https://a.org", &"x".repeat(500))
            .await
            .unwrap();

        let prompt = ai.last_prompt().unwrap();
        assert!(prompt.ends_with(&"x".repeat(10)));
        assert!(!prompt.contains(&"x".repeat(11)));
    }

    #[tokio::test]
    async fn test_failures_map_to_assist_errors() {
        let unavailable = AiContactAssist::new(Arc::new(UnavailableAI));
        assert!(matches!(
            unavailable.extract_contacts("https://a.org", "t").await,
            Err(AssistError::Unavailable)
        ));

        let prose = AiContactAssist::new(Arc::new(MockAI::new().with_response("no contacts here")));
        assert!(matches!(
            prose.extract_contacts("https://a.org", "t").await,
            Err(AssistError::Malformed(_))
        ));

        let empty = AiContactAssist::new(Arc::new(MockAI::new().with_response(r#"{"phones": []}"#)));
        assert!(matches!(
            empty.extract_contacts("https://a.org", "t").await,
            Err(AssistError::Empty)
        ));
    }
}
