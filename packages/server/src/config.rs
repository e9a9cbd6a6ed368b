use anyhow::{Context, Result};
use contact_extraction::SecretString;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://api.cerebras.ai/v1";
pub const DEFAULT_INFERENCE_MODEL: &str = "llama-4-scout-17b-16e-instruct";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub inference_api_key: Option<SecretString>,
    pub inference_base_url: String,
    pub inference_model: String,
    pub tavily_api_key: Option<SecretString>,
    pub collaborator_timeout: Duration,
    pub fetch_max_chars: usize,
    pub search_results: usize,
    pub assist_max_chars: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            inference_api_key: SecretString::from_env("INFERENCE_API_KEY"),
            inference_base_url: env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_BASE_URL.to_string()),
            inference_model: env::var("INFERENCE_MODEL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_MODEL.to_string()),
            tavily_api_key: SecretString::from_env("TAVILY_API_KEY"),
            collaborator_timeout: Duration::from_secs(
                parse_or("COLLABORATOR_TIMEOUT_SECS", 20)
                    .context("COLLABORATOR_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            fetch_max_chars: parse_or("FETCH_MAX_CHARS", 8000)
                .context("FETCH_MAX_CHARS must be a valid number")?,
            search_results: parse_or("SEARCH_RESULTS", 3)
                .context("SEARCH_RESULTS must be a valid number")?,
            assist_max_chars: parse_or("ASSIST_MAX_CHARS", 6000)
                .context("ASSIST_MAX_CHARS must be a valid number")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_api_key: None,
            inference_base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
            inference_model: DEFAULT_INFERENCE_MODEL.to_string(),
            tavily_api_key: None,
            collaborator_timeout: Duration::from_secs(20),
            fetch_max_chars: 8000,
            search_results: 3,
            assist_max_chars: 6000,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
