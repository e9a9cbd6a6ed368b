//! Inference adapters implementing [`BaseAI`].

use async_trait::async_trait;
use contact_extraction::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{BaseAI, InferenceError};

const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 1024;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http_client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Config(e.to_string()))?;

        let base_url: String = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| InferenceError::Config(format!("invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl BaseAI for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let start = std::time::Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Inference request failed");
                if e.is_timeout() {
                    InferenceError::Timeout
                } else {
                    InferenceError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Inference API error");
            return Err(InferenceError::Api(format!("{}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Api(format!("unreadable response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InferenceError::Api("response had no content".into()))?;

        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "Inference completed"
        );

        Ok(content)
    }
}

/// Stand-in when no inference backend is configured. Every call fails, which
/// sends callers straight to their local tier.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAI;

#[async_trait]
impl BaseAI for UnavailableAI {
    async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
        Err(InferenceError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = ChatCompletionsClient::new(
            SecretString::new("key"),
            "not a url",
            "model",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(InferenceError::Config(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ChatCompletionsClient::new(
            SecretString::new("key"),
            "https://api.example.com/v1/",
            "llama",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.model(), "llama");
    }

    #[tokio::test]
    async fn test_unavailable_ai_always_fails() {
        assert!(matches!(
            UnavailableAI.complete_json("anything").await,
            Err(InferenceError::Unavailable)
        ));
    }
}
