//! Where the caller is, as far as the handlers are concerned.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::common::{lenient, StructuredReply};
use crate::domains::triage::data::gazetteer;
use crate::domains::triage::models::{QueryInfo, Tier};
use crate::kernel::{bounded, Coordinates, TriageDeps};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    /// Local when the gazetteer or the last-resort name was used
    pub source: Tier,
}

impl ResolvedLocation {
    pub fn to_json(&self) -> Value {
        json!({
            "location": self.name,
            "coordinates": self.coordinates,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeReply {
    #[serde(default, alias = "location", deserialize_with = "lenient::text")]
    location_name: Option<String>,
    #[serde(default, alias = "latitude", deserialize_with = "lenient::number")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude", deserialize_with = "lenient::number")]
    lon: Option<f64>,
}

/// Analyzer's location first, then the model, then the gazetteer.
pub async fn resolve_location(
    query: &str,
    query_info: &QueryInfo,
    deps: &TriageDeps,
    progress_source: &str,
) -> ResolvedLocation {
    if let (Some(name), Some(coordinates)) = (&query_info.location, query_info.coordinates) {
        deps.progress
            .notify(progress_source, &format!("Using provided location: {}", name));
        return ResolvedLocation {
            name: name.clone(),
            coordinates: Some(coordinates),
            source: Tier::Remote,
        };
    }

    deps.progress
        .notify(progress_source, "Extracting location and coordinates from query...");

    if let Some(resolved) = geocode(query, query_info, deps).await {
        info!(location = %resolved.name, "Location geocoded");
        return resolved;
    }

    resolve_locally(query, query_info)
}

async fn geocode(query: &str, query_info: &QueryInfo, deps: &TriageDeps) -> Option<ResolvedLocation> {
    let prompt = format!(
        r#"Analyze the following query and extract location information.
Return ONLY a JSON object with keys:
- "location_name": The name of the location mentioned
- "lat": The approximate latitude as a float
- "lon": The approximate longitude as a float

Query: "{}"
Known location: {}"#,
        query,
        query_info.location.as_deref().unwrap_or("none")
    );

    let raw = bounded(
        "inference",
        deps.settings.collaborator_timeout,
        deps.ai.complete_json(&prompt),
    )
    .await
    .ok()?;

    let reply: GeocodeReply = match StructuredReply::parse(&raw).decode() {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Unreadable geocode reply");
            return None;
        }
    };

    let coordinates = Coordinates::new(reply.lat?, reply.lon?);
    if !coordinates.is_valid() {
        warn!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "Geocode reply out of range"
        );
        return None;
    }

    let name = query_info
        .location
        .clone()
        .or(reply.location_name)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    Some(ResolvedLocation {
        name,
        coordinates: Some(coordinates),
        source: Tier::Remote,
    })
}

/// Gazetteer over the analyzed location, then the query text. With no match
/// the analyzed name (or "Unknown Location") is kept without coordinates.
pub fn resolve_locally(query: &str, query_info: &QueryInfo) -> ResolvedLocation {
    let place = query_info
        .location
        .as_deref()
        .and_then(gazetteer::lookup)
        .or_else(|| gazetteer::lookup(query));

    match place {
        Some(place) => ResolvedLocation {
            name: query_info
                .location
                .clone()
                .unwrap_or_else(|| place.name.to_string()),
            coordinates: Some(place.coordinates()),
            source: Tier::Local,
        },
        None => ResolvedLocation {
            name: query_info
                .location
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            coordinates: None,
            source: Tier::Local,
        },
    }
}
