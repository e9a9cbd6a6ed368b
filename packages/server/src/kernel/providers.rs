//! Placeholder geographic data providers.
//!
//! No weather, hazard, shelter or route feed is wired in yet. These adapters
//! fail every call so handlers render the "unavailable" sections and point
//! people at local authorities.

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::traits::{
    BaseHazardService, BaseRouteService, BaseShelterService, BaseWeatherService, Coordinates,
    EvacuationRoute, HazardReport, Shelter, WeatherReport,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredProvider;

#[async_trait]
impl BaseWeatherService for UnconfiguredProvider {
    async fn alerts(&self, _at: Coordinates) -> Result<WeatherReport> {
        bail!("no weather provider configured")
    }
}

#[async_trait]
impl BaseHazardService for UnconfiguredProvider {
    async fn detections(&self, _at: Coordinates) -> Result<HazardReport> {
        bail!("no hazard provider configured")
    }
}

#[async_trait]
impl BaseShelterService for UnconfiguredProvider {
    async fn shelters(&self, _at: Coordinates) -> Result<Vec<Shelter>> {
        bail!("no shelter provider configured")
    }
}

#[async_trait]
impl BaseRouteService for UnconfiguredProvider {
    async fn evacuation_routes(&self, _at: Coordinates) -> Result<Vec<EvacuationRoute>> {
        bail!("no route provider configured")
    }
}
