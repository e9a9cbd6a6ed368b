//! Structured replies from text-producing collaborators.
//!
//! Models are asked for a JSON object but routinely wrap it in prose or code
//! fences. [`StructuredReply::parse`] makes the recovery explicit: the caller
//! always gets either a JSON object or the raw text tagged as malformed, and
//! decides what to do with each.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

const EXCERPT_CHARS: usize = 120;

/// A collaborator reply after JSON recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply {
    Parsed(Value),
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply is not a JSON object: {excerpt}")]
    Malformed { excerpt: String },

    #[error("reply does not match the expected shape: {0}")]
    Schema(#[source] serde_json::Error),
}

impl StructuredReply {
    /// Parse the whole reply as an object, then retry on the outermost
    /// `{`…`}` span.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return StructuredReply::Parsed(value);
        }

        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                if let Ok(value @ Value::Object(_)) =
                    serde_json::from_str::<Value>(&trimmed[start..=end])
                {
                    return StructuredReply::Parsed(value);
                }
            }
        }

        StructuredReply::Malformed(raw.to_string())
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, StructuredReply::Parsed(_))
    }

    /// Decode into a typed record.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ParseError> {
        match self {
            StructuredReply::Parsed(value) => serde_json::from_value(value).map_err(ParseError::Schema),
            StructuredReply::Malformed(raw) => Err(ParseError::Malformed {
                excerpt: raw.chars().take(EXCERPT_CHARS).collect(),
            }),
        }
    }
}

/// Serde helpers for model output that does not respect its schema.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A number, or a string holding one. Anything else is `None`.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// A bool, or the strings "true"/"yes"/"false"/"no".
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// A non-empty string. `"null"` and blanks count as absent.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => {
                let s = s.trim();
                (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
            }
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// A list of strings, or a single string standing in for a list of one.
    pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => items,
            Some(single) => vec![single],
            None => Vec::new(),
        };

        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient::number")]
        score: Option<f64>,
        #[serde(default, deserialize_with = "lenient::strings")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "lenient::text")]
        name: Option<String>,
    }

    #[test]
    fn test_parses_bare_object() {
        let reply = StructuredReply::parse(r#"{"intent": "rescue"}"#);
        assert!(reply.is_parsed());
    }

    #[test]
    fn test_recovers_object_wrapped_in_prose() {
        let raw = "Sure! Here is the JSON:\n```json\n{\"intent\": \"resource\"}\n```\nStay safe.";
        match StructuredReply::parse(raw) {
            StructuredReply::Parsed(value) => assert_eq!(value["intent"], "resource"),
            other => panic!("expected parsed reply, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(!StructuredReply::parse("[1, 2, 3]").is_parsed());
        assert!(!StructuredReply::parse("I cannot help with that").is_parsed());
        assert!(!StructuredReply::parse("} backwards {").is_parsed());
        assert!(!StructuredReply::parse("").is_parsed());
    }

    #[test]
    fn test_decode_malformed_is_error() {
        let err = StructuredReply::parse("no json here")
            .decode::<Probe>()
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn test_lenient_fields() {
        let probe: Probe = StructuredReply::parse(r#"{"score": "0.8", "tags": "flood", "name": "null"}"#)
            .decode()
            .unwrap();
        assert_eq!(probe.score, Some(0.8));
        assert_eq!(probe.tags, vec!["flood"]);
        assert_eq!(probe.name, None);
    }
}
