//! Driving-directions providers
//!
//! Google Directions for direct calls, a server-side routing proxy when the
//! subscription key must stay on the server, mock for tests and offline use.

mod google;
mod polyline;
mod proxy;
#[cfg(test)]
mod stub_server;

pub use google::{GoogleDirectionsClient, GoogleDirectionsConfig, GOOGLE_DIRECTIONS_URL};
pub use proxy::{ProxyDirectionsClient, ProxyDirectionsConfig, DEFAULT_PROXY_API_VERSION};

use async_trait::async_trait;
use tracing::info;

use crate::error::DirectionsError;
use crate::services::geo::{haversine_distance, nearest_neighbor_order};
use crate::types::{Coordinates, Location, RouteGeometry, RouteLeg};

/// One directions query: fixed endpoints plus intermediate waypoints
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Location,
    pub destination: Location,
    /// May be empty
    pub waypoints: Vec<Coordinates>,
    /// Let the provider reorder `waypoints`; endpoints never move
    pub optimize: bool,
}

/// What a provider answered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionsResponse {
    /// Legs in travel order
    pub legs: Vec<RouteLeg>,
    /// 0-based indices into `DirectionsRequest::waypoints`, in visiting order
    pub waypoint_order: Option<Vec<usize>>,
    pub geometry: RouteGeometry,
}

/// Directions provider abstraction (Google, proxy, mock)
#[async_trait]
pub trait DirectionsClient: Send + Sync {
    async fn route(&self, request: &DirectionsRequest)
        -> Result<DirectionsResponse, DirectionsError>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Provider selection, resolved from configuration at startup
#[derive(Debug, Clone)]
pub enum DirectionsConfig {
    Google(GoogleDirectionsConfig),
    Proxy(ProxyDirectionsConfig),
    Mock,
}

/// Create directions client based on configuration
pub fn create_directions_client(
    config: DirectionsConfig,
) -> Result<Box<dyn DirectionsClient>, DirectionsError> {
    let client: Box<dyn DirectionsClient> = match config {
        DirectionsConfig::Google(cfg) => Box::new(GoogleDirectionsClient::new(cfg)?),
        DirectionsConfig::Proxy(cfg) => Box::new(ProxyDirectionsClient::new(cfg)?),
        DirectionsConfig::Mock => Box::new(MockDirectionsClient::new()),
    };
    info!("Using {} directions provider", client.name());
    Ok(client)
}

/// Mock directions provider for tests
/// Uses Haversine distance × coefficient for estimation
pub struct MockDirectionsClient {
    /// Coefficient for converting straight-line to road distance (default: 1.3)
    road_coefficient: f64,
    /// Average speed in km/h for time estimation (default: 40)
    average_speed_kmh: f64,
}

impl Default for MockDirectionsClient {
    fn default() -> Self {
        Self {
            road_coefficient: 1.3,
            average_speed_kmh: 40.0,
        }
    }
}

impl MockDirectionsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(road_coefficient: f64, average_speed_kmh: f64) -> Self {
        Self {
            road_coefficient,
            average_speed_kmh,
        }
    }

    fn estimate_leg(&self, from: &Coordinates, to: &Coordinates) -> RouteLeg {
        let road_km = haversine_distance(from, to) * self.road_coefficient;
        RouteLeg {
            distance_meters: (road_km * 1000.0) as u64,
            duration_seconds: (road_km / self.average_speed_kmh * 3600.0) as u64,
        }
    }
}

fn resolve(location: &Location) -> Result<Coordinates, DirectionsError> {
    match location {
        Location::Coordinates(c) => Ok(*c),
        Location::Address(address) => Err(DirectionsError::rejected(
            "NOT_FOUND",
            format!("mock provider cannot geocode '{}'", address),
        )),
    }
}

#[async_trait]
impl DirectionsClient for MockDirectionsClient {
    async fn route(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let origin = resolve(&request.origin)?;
        let destination = resolve(&request.destination)?;

        let order: Vec<usize> = if request.optimize {
            nearest_neighbor_order(&origin, &request.waypoints)
        } else {
            (0..request.waypoints.len()).collect()
        };

        let mut points = Vec::with_capacity(order.len() + 2);
        points.push(origin);
        points.extend(order.iter().map(|&i| request.waypoints[i]));
        points.push(destination);

        let legs = points
            .windows(2)
            .map(|pair| self.estimate_leg(&pair[0], &pair[1]))
            .collect();

        Ok(DirectionsResponse {
            legs,
            waypoint_order: request.optimize.then_some(order),
            geometry: RouteGeometry::from_coordinates(&points),
        })
    }

    fn name(&self) -> &str {
        "MockDirections"
    }
}
