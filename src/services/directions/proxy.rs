//! Server-side routing proxy client
//!
//! Posts a GeoJSON FeatureCollection of route points to a route-directions
//! endpoint. The subscription key is read from server configuration and sent as
//! a header, so it never leaves the backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DirectionsClient, DirectionsRequest, DirectionsResponse};
use crate::error::DirectionsError;
use crate::types::{Coordinates, Location, RouteGeometry, RouteLeg};

pub const DEFAULT_PROXY_API_VERSION: &str = "2025-01-01";

const SUBSCRIPTION_KEY_HEADER: &str = "subscription-key";

/// Routing proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyDirectionsConfig {
    /// Full URL of the route-directions endpoint
    pub base_url: String,
    pub subscription_key: String,
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl ProxyDirectionsConfig {
    pub fn new(base_url: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            subscription_key: subscription_key.into(),
            api_version: DEFAULT_PROXY_API_VERSION.to_string(),
            timeout_seconds: 15,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Routing proxy client
pub struct ProxyDirectionsClient {
    client: Client,
    config: ProxyDirectionsConfig,
}

impl ProxyDirectionsClient {
    pub fn new(config: ProxyDirectionsConfig) -> Result<Self, DirectionsError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DirectionsError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Build the GeoJSON request body: origin, waypoints, destination
    fn build_route_request(
        &self,
        request: &DirectionsRequest,
    ) -> Result<RouteRequest, DirectionsError> {
        let origin = endpoint(&request.origin)?;
        let destination = endpoint(&request.destination)?;

        let points = std::iter::once(origin)
            .chain(request.waypoints.iter().copied())
            .chain(std::iter::once(destination));

        let features = points
            .enumerate()
            .map(|(i, c)| PointFeature {
                kind: "Feature",
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: [c.lng, c.lat],
                },
                properties: PointProperties {
                    point_index: i,
                    point_type: "waypoint",
                },
            })
            .collect();

        Ok(RouteRequest {
            kind: "FeatureCollection",
            features,
            travel_mode: "driving",
            optimize_waypoint_order: request.optimize,
            optimize_route: "fastestWithTraffic",
            route_output_options: vec!["routePath"],
        })
    }
}

fn endpoint(location: &Location) -> Result<Coordinates, DirectionsError> {
    match location {
        Location::Coordinates(c) => Ok(*c),
        Location::Address(address) => Err(DirectionsError::rejected(
            "INVALID_REQUEST",
            format!("routing proxy needs coordinates, got address '{}'", address),
        )),
    }
}

#[async_trait]
impl DirectionsClient for ProxyDirectionsClient {
    async fn route(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let body = self.build_route_request(request)?;

        debug!(
            "Requesting directions from routing proxy for {} points (optimize={})",
            body.features.len(),
            request.optimize
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .query(&[("api-version", self.config.api_version.as_str())])
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DirectionsError::from_request(e, self.config.timeout()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(DirectionsError::Transport(format!(
                "Routing proxy unavailable: {}",
                status
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => DirectionsError::rejected(err.error.code, err.error.message),
                Err(_) => DirectionsError::rejected(status.as_str(), text),
            });
        }

        let collection: RouteResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::from_request(e, self.config.timeout()))?;

        parse_response(collection, request.optimize)
    }

    fn name(&self) -> &str {
        "RouteProxy"
    }
}

fn parse_response(
    collection: RouteResponse,
    optimize: bool,
) -> Result<DirectionsResponse, DirectionsError> {
    let path = collection
        .features
        .into_iter()
        .find(|f| f.properties.kind.as_deref() == Some("RoutePath"))
        .ok_or_else(|| {
            DirectionsError::rejected("ZERO_RESULTS", "Response contained no route path")
        })?;

    let legs = path
        .properties
        .legs
        .iter()
        .map(|leg| RouteLeg {
            distance_meters: leg.distance_in_meters.map_or(0, |d| d.max(0.0).round() as u64),
            duration_seconds: leg.duration_in_seconds.map_or(0, |d| d.max(0.0).round() as u64),
        })
        .collect();

    let waypoint_order = if optimize {
        path.properties.optimized_waypoints.map(|mut entries| {
            entries.sort_by_key(|e| e.optimized_index);
            entries.into_iter().map(|e| e.input_index).collect()
        })
    } else {
        None
    };

    let geometry = match path.geometry {
        Some(geometry) => flatten_geometry(geometry),
        None => RouteGeometry::empty(),
    };

    Ok(DirectionsResponse {
        legs,
        waypoint_order,
        geometry,
    })
}

/// Concatenate line parts, dropping the point shared between consecutive parts
fn flatten_geometry(geometry: ResponseGeometry) -> RouteGeometry {
    let parsed = match geometry.kind.as_str() {
        "MultiLineString" => serde_json::from_value::<Vec<Vec<[f64; 2]>>>(geometry.coordinates),
        "LineString" => {
            serde_json::from_value::<Vec<[f64; 2]>>(geometry.coordinates).map(|line| vec![line])
        }
        other => {
            warn!("Ignoring unsupported route geometry type {}", other);
            Ok(vec![])
        }
    };
    let parts = parsed.unwrap_or_else(|e| {
        warn!("Ignoring malformed {} route geometry: {}", geometry.kind, e);
        vec![]
    });

    let mut coordinates: Vec<[f64; 2]> = Vec::new();
    for part in parts {
        let skip = usize::from(coordinates.last().is_some() && coordinates.last() == part.first());
        coordinates.extend(part.into_iter().skip(skip));
    }

    RouteGeometry { coordinates }
}

// Routing proxy API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<PointFeature>,
    travel_mode: &'static str,
    optimize_waypoint_order: bool,
    optimize_route: &'static str,
    route_output_options: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct PointFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: PointGeometry,
    properties: PointProperties,
}

#[derive(Debug, Serialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// [lng, lat]
    coordinates: [f64; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    point_index: usize,
    point_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    features: Vec<ResponseFeature>,
}

#[derive(Debug, Deserialize)]
struct ResponseFeature {
    #[serde(default)]
    geometry: Option<ResponseGeometry>,
    properties: ResponseProperties,
}

#[derive(Debug, Deserialize)]
struct ResponseGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseProperties {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    legs: Vec<ResponseLeg>,
    /// `inputIndex` refers to the intermediate waypoints only
    #[serde(default)]
    optimized_waypoints: Option<Vec<OptimizedWaypoint>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseLeg {
    distance_in_meters: Option<f64>,
    duration_in_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptimizedWaypoint {
    input_index: usize,
    optimized_index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}
