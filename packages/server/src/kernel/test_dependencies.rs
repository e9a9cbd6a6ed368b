// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into TriageDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use contact_extraction::testing::MockContactAssist;
use contact_extraction::{MockFetcher, MockWebSearcher, RecordingProgress};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseAI, BaseHazardService, BaseRouteService, BaseShelterService, BaseWeatherService,
    Coordinates, EvacuationRoute, HazardReport, InferenceError, Shelter, TriageDeps,
    TriageSettings, WeatherReport,
};

// =============================================================================
// Mock AI
// =============================================================================

pub struct MockAI {
    /// Replies chosen by a substring of the prompt, checked before the queue
    keyed: Arc<Mutex<Vec<(String, String)>>>,
    responses: Arc<Mutex<Vec<String>>>,
    failing: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            keyed: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(Vec::new())),
            failing: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails as if the backend were down
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Add a JSON response to the queue (will be serialized)
    pub fn with_json_response<T: serde::Serialize>(self, data: &T) -> Self {
        let json = serde_json::to_string(data).expect("Failed to serialize mock response");
        self.responses.lock().unwrap().push(json);
        self
    }

    /// Reply with `response` whenever the prompt contains `needle`
    pub fn with_response_for(self, needle: &str, response: impl Into<String>) -> Self {
        self.keyed
            .lock()
            .unwrap()
            .push((needle.to_string(), response.into()));
        self
    }

    /// Get all prompts that were sent to the AI
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last prompt sent to the AI
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Check if a prompt containing the given text was sent
    pub fn was_called_with(&self, text: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.contains(text))
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, InferenceError> {
        // Record the call
        self.calls.lock().unwrap().push(prompt.to_string());

        if self.failing {
            return Err(InferenceError::Network("mock AI offline".to_string()));
        }

        let keyed = self
            .keyed
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone());
        if let Some(response) = keyed {
            return Ok(response);
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            // Return default mock response
            Ok("Mock AI response".to_string())
        }
    }
}

// =============================================================================
// Mock geographic providers
// =============================================================================

/// One mock standing in for the weather, hazard, shelter and route services.
///
/// Anything not configured fails. `panicking_on("weather")` makes that
/// service panic instead, for exercising panic isolation.
#[derive(Clone, Default)]
pub struct MockProviders {
    weather: Option<WeatherReport>,
    hazards: Option<HazardReport>,
    shelters: Option<Vec<Shelter>>,
    routes: Option<Vec<EvacuationRoute>>,
    panic_on: Option<&'static str>,
    calls: Arc<Mutex<Vec<(String, Coordinates)>>>,
}

impl MockProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weather(mut self, report: WeatherReport) -> Self {
        self.weather = Some(report);
        self
    }

    pub fn with_hazards(mut self, report: HazardReport) -> Self {
        self.hazards = Some(report);
        self
    }

    pub fn with_shelters(mut self, shelters: Vec<Shelter>) -> Self {
        self.shelters = Some(shelters);
        self
    }

    pub fn with_routes(mut self, routes: Vec<EvacuationRoute>) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn panicking_on(mut self, service: &'static str) -> Self {
        self.panic_on = Some(service);
        self
    }

    /// `(service, coordinates)` for every call received
    pub fn calls(&self) -> Vec<(String, Coordinates)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, service: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(s, _)| s == service)
    }

    fn answer<T: Clone>(&self, service: &'static str, at: Coordinates, value: &Option<T>) -> Result<T> {
        self.calls.lock().unwrap().push((service.to_string(), at));
        if self.panic_on == Some(service) {
            panic!("mock {} service panicked", service);
        }
        value
            .clone()
            .ok_or_else(|| anyhow!("mock {} service unavailable", service))
    }
}

#[async_trait]
impl BaseWeatherService for MockProviders {
    async fn alerts(&self, at: Coordinates) -> Result<WeatherReport> {
        self.answer("weather", at, &self.weather)
    }
}

#[async_trait]
impl BaseHazardService for MockProviders {
    async fn detections(&self, at: Coordinates) -> Result<HazardReport> {
        self.answer("hazards", at, &self.hazards)
    }
}

#[async_trait]
impl BaseShelterService for MockProviders {
    async fn shelters(&self, at: Coordinates) -> Result<Vec<Shelter>> {
        self.answer("shelters", at, &self.shelters)
    }
}

#[async_trait]
impl BaseRouteService for MockProviders {
    async fn evacuation_routes(&self, at: Coordinates) -> Result<Vec<EvacuationRoute>> {
        self.answer("routes", at, &self.routes)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

/// Defaults model a total outage: the AI and search fail, no page is
/// fetchable and no provider answers.
#[derive(Clone)]
pub struct TestDependencies {
    pub ai: Arc<MockAI>,
    pub fetcher: Arc<MockFetcher>,
    pub web_searcher: Arc<MockWebSearcher>,
    pub contact_assist: Option<Arc<MockContactAssist>>,
    pub providers: Arc<MockProviders>,
    pub progress: Arc<RecordingProgress>,
    pub settings: TriageSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            ai: Arc::new(MockAI::failing()),
            fetcher: Arc::new(MockFetcher::new()),
            web_searcher: Arc::new(MockWebSearcher::failing()),
            contact_assist: None,
            providers: Arc::new(MockProviders::new()),
            progress: Arc::new(RecordingProgress::new()),
            settings: TriageSettings {
                collaborator_timeout: Duration::from_secs(2),
                ..TriageSettings::default()
            },
        }
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock page fetcher
    pub fn mock_fetcher(mut self, fetcher: MockFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Set a mock web searcher
    pub fn mock_search(mut self, searcher: MockWebSearcher) -> Self {
        self.web_searcher = Arc::new(searcher);
        self
    }

    /// Set a mock assisted extractor
    pub fn mock_assist(mut self, assist: MockContactAssist) -> Self {
        self.contact_assist = Some(Arc::new(assist));
        self
    }

    /// Set the mock geographic providers
    pub fn mock_providers(mut self, providers: MockProviders) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.collaborator_timeout = timeout;
        self
    }

    /// Build the dependency container; the mocks stay reachable through `self`.
    pub fn deps(&self) -> TriageDeps {
        TriageDeps {
            ai: self.ai.clone(),
            fetcher: self.fetcher.clone(),
            web_searcher: self.web_searcher.clone(),
            contact_assist: self
                .contact_assist
                .clone()
                .map(|assist| assist as Arc<dyn contact_extraction::ContactAssist>),
            weather: self.providers.clone(),
            hazards: self.providers.clone(),
            shelters: self.providers.clone(),
            routes: self.providers.clone(),
            progress: self.progress.clone(),
            settings: self.settings,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
