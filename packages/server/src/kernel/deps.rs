//! Triage dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by every triage
//! activity and handler. All external services sit behind trait objects so
//! tests can swap in mocks.

use anyhow::{Context, Result};
use contact_extraction::{
    ContactAggregator, ContactAssist, HttpFetcher, NoopWebSearcher, PageFetcher, ProgressSink,
    TavilyWebSearcher, TracingProgress, WebSearcher,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::ai::{ChatCompletionsClient, UnavailableAI};
use super::contact_assist::AiContactAssist;
use super::providers::UnconfiguredProvider;
use super::traits::{
    BaseAI, BaseHazardService, BaseRouteService, BaseShelterService, BaseWeatherService,
};
use crate::config::Config;

/// Limits applied to collaborator calls.
#[derive(Debug, Clone, Copy)]
pub struct TriageSettings {
    pub collaborator_timeout: Duration,
    pub fetch_max_chars: usize,
    pub search_results: usize,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            collaborator_timeout: Duration::from_secs(20),
            fetch_max_chars: contact_extraction::DEFAULT_MAX_CHARS,
            search_results: 3,
        }
    }
}

/// Dependencies accessible to triage activities and handlers
#[derive(Clone)]
pub struct TriageDeps {
    pub ai: Arc<dyn BaseAI>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub web_searcher: Arc<dyn WebSearcher>,
    /// Second-chance contact extraction (None when no model is configured)
    pub contact_assist: Option<Arc<dyn ContactAssist>>,
    pub weather: Arc<dyn BaseWeatherService>,
    pub hazards: Arc<dyn BaseHazardService>,
    pub shelters: Arc<dyn BaseShelterService>,
    pub routes: Arc<dyn BaseRouteService>,
    pub progress: Arc<dyn ProgressSink>,
    pub settings: TriageSettings,
}

impl TriageDeps {
    /// Wire production adapters from configuration. Missing API keys select
    /// the adapters that send every request to the local tiers.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = TriageSettings {
            collaborator_timeout: config.collaborator_timeout,
            fetch_max_chars: config.fetch_max_chars,
            search_results: config.search_results,
        };

        let (ai, contact_assist): (Arc<dyn BaseAI>, Option<Arc<dyn ContactAssist>>) =
            match &config.inference_api_key {
                Some(key) => {
                    let client = ChatCompletionsClient::new(
                        key.clone(),
                        config.inference_base_url.clone(),
                        config.inference_model.clone(),
                        config.collaborator_timeout,
                    )
                    .context("Failed to build inference client")?;
                    info!(model = %config.inference_model, "Inference client configured");

                    let ai: Arc<dyn BaseAI> = Arc::new(client);
                    let assist: Arc<dyn ContactAssist> = Arc::new(
                        AiContactAssist::new(ai.clone()).with_max_chars(config.assist_max_chars),
                    );
                    (ai, Some(assist))
                }
                None => {
                    warn!("INFERENCE_API_KEY not set, all queries use local processing");
                    let ai: Arc<dyn BaseAI> = Arc::new(UnavailableAI);
                    (ai, None)
                }
            };

        let web_searcher: Arc<dyn WebSearcher> = match &config.tavily_api_key {
            Some(key) => {
                let client = reqwest::Client::builder()
                    .timeout(config.collaborator_timeout)
                    .build()
                    .context("Failed to build search HTTP client")?;
                Arc::new(
                    TavilyWebSearcher::new(key.expose())
                        .with_client(client)
                        .with_default_limit(config.search_results),
                )
            }
            None => {
                warn!("TAVILY_API_KEY not set, web search disabled");
                Arc::new(NoopWebSearcher)
            }
        };

        Ok(Self {
            ai,
            fetcher: Arc::new(HttpFetcher::with_timeout(config.collaborator_timeout)),
            web_searcher,
            contact_assist,
            weather: Arc::new(UnconfiguredProvider),
            hazards: Arc::new(UnconfiguredProvider),
            shelters: Arc::new(UnconfiguredProvider),
            routes: Arc::new(UnconfiguredProvider),
            progress: Arc::new(TracingProgress),
            settings,
        })
    }

    /// Contact aggregator sharing this container's fetcher, assist and sink.
    pub fn aggregator(&self) -> ContactAggregator {
        let aggregator = ContactAggregator::new(self.fetcher.clone())
            .with_progress(self.progress.clone())
            .with_max_chars(self.settings.fetch_max_chars)
            .with_fetch_timeout(self.settings.collaborator_timeout);

        match &self.contact_assist {
            Some(assist) => aggregator.with_assist(assist.clone()),
            None => aggregator,
        }
    }
}
