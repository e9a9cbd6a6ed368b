//! Specialist handlers, one per routable intent.
//!
//! Each handler resolves what it needs, fans out to its collaborators, and
//! renders a brief. Collaborator failures degrade to missing data; only the
//! resource handler's search can fail the handler as a whole.

pub mod brief;
pub mod information;
pub mod location;
pub mod rescue;
pub mod resource;

use std::future::Future;
use tracing::debug;

use crate::kernel::{bounded, Coordinates, TriageDeps};

pub use information::handle_information;
pub use location::{resolve_location, ResolvedLocation, UNKNOWN_LOCATION};
pub use rescue::handle_rescue;
pub use resource::handle_resource;

/// Call a coordinate-based collaborator within the collaborator timeout.
///
/// Without coordinates the call is skipped. Failures and timeouts are
/// logged by [`bounded`] and come back as `None`.
pub(crate) async fn gather<T, F, Fut>(
    name: &'static str,
    at: Option<Coordinates>,
    deps: &TriageDeps,
    call: F,
) -> Option<T>
where
    F: FnOnce(Coordinates) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let Some(at) = at else {
        debug!(collaborator = name, "No coordinates, skipping collaborator");
        return None;
    };

    bounded(name, deps.settings.collaborator_timeout, call(at))
        .await
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{HazardReport, MockProviders, TestDependencies, WeatherReport};

    #[tokio::test]
    async fn test_gather_skips_without_coordinates() {
        let providers = MockProviders::new().with_weather(WeatherReport::default());
        let deps = TestDependencies::new().mock_providers(providers);
        let triage = deps.deps();

        let report = gather("weather", None, &triage, |at| triage.weather.alerts(at)).await;

        assert!(report.is_none());
        assert!(!deps.providers.was_called("weather"));
    }

    #[tokio::test]
    async fn test_gather_maps_failure_to_none() {
        let providers = MockProviders::new().with_weather(WeatherReport::default());
        let deps = TestDependencies::new().mock_providers(providers);
        let triage = deps.deps();
        let at = Some(Coordinates::new(25.7617, -80.1918));

        let weather = gather("weather", at, &triage, |at| triage.weather.alerts(at)).await;
        let hazards: Option<HazardReport> =
            gather("hazards", at, &triage, |at| triage.hazards.detections(at)).await;

        assert!(weather.is_some());
        assert!(hazards.is_none());
        assert!(deps.providers.was_called("hazards"));
    }
}
