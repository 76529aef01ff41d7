//! Google Directions web service client
//!
//! API documentation:
//! https://developers.google.com/maps/documentation/directions/get-directions

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::polyline::decode_polyline;
use super::{DirectionsClient, DirectionsRequest, DirectionsResponse};
use crate::error::DirectionsError;
use crate::types::{RouteGeometry, RouteLeg};

pub const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Google polylines are encoded with 5 decimal places
const GOOGLE_POLYLINE_PRECISION: u32 = 5;

/// Google Directions client configuration
#[derive(Debug, Clone)]
pub struct GoogleDirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl GoogleDirectionsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GOOGLE_DIRECTIONS_URL.to_string(),
            api_key: api_key.into(),
            timeout_seconds: 15,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Google Directions client
pub struct GoogleDirectionsClient {
    client: Client,
    config: GoogleDirectionsConfig,
}

impl GoogleDirectionsClient {
    pub fn new(config: GoogleDirectionsConfig) -> Result<Self, DirectionsError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DirectionsError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Query parameters, without the API key
    fn build_query(&self, request: &DirectionsRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", request.origin.to_string()),
            ("destination", request.destination.to_string()),
            ("mode", "driving".to_string()),
        ];

        if !request.waypoints.is_empty() {
            let mut parts: Vec<String> = Vec::with_capacity(request.waypoints.len() + 1);
            if request.optimize {
                parts.push("optimize:true".to_string());
            }
            parts.extend(request.waypoints.iter().map(|w| w.to_string()));
            query.push(("waypoints", parts.join("|")));
        }

        query
    }
}

#[async_trait]
impl DirectionsClient for GoogleDirectionsClient {
    async fn route(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let mut query = self.build_query(request);
        query.push(("key", self.config.api_key.clone()));

        debug!(
            "Requesting directions from Google with {} waypoints (optimize={})",
            request.waypoints.len(),
            request.optimize
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| DirectionsError::from_request(e, self.config.timeout()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(DirectionsError::Transport(format!(
                "Google Directions unavailable: {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::rejected(status.as_str(), body));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::from_request(e, self.config.timeout()))?;

        parse_response(body, request.optimize)
    }

    fn name(&self) -> &str {
        "GoogleDirections"
    }
}

fn parse_response(
    body: ApiResponse,
    optimize: bool,
) -> Result<DirectionsResponse, DirectionsError> {
    if body.status != "OK" {
        return Err(DirectionsError::rejected(
            body.status,
            body.error_message.unwrap_or_default(),
        ));
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| {
            DirectionsError::rejected("ZERO_RESULTS", "Response contained no routes")
        })?;

    let legs = route
        .legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            if leg.distance.is_none() || leg.duration.is_none() {
                warn!("Google leg {} is missing distance or duration", i);
            }
            RouteLeg {
                distance_meters: leg.distance.as_ref().map_or(0, |d| d.value),
                duration_seconds: leg.duration.as_ref().map_or(0, |d| d.value),
            }
        })
        .collect();

    // Geometry is display-only and never fails the route
    let geometry = match route.overview_polyline {
        Some(polyline) => match decode_polyline(&polyline.points, GOOGLE_POLYLINE_PRECISION) {
            Ok(coordinates) => RouteGeometry { coordinates },
            Err(e) => {
                warn!("Dropping undecodable Google overview polyline: {}", e);
                RouteGeometry::empty()
            }
        },
        None => RouteGeometry::empty(),
    };

    Ok(DirectionsResponse {
        legs,
        waypoint_order: if optimize { route.waypoint_order } else { None },
        geometry,
    })
}

// Google Directions API types

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    legs: Vec<ApiLeg>,
    /// Present whenever waypoints were sent; identity unless optimized
    #[serde(default)]
    waypoint_order: Option<Vec<usize>>,
    #[serde(default)]
    overview_polyline: Option<ApiPolyline>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: Option<ApiValue>,
    duration: Option<ApiValue>,
}

#[derive(Debug, Deserialize)]
struct ApiValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}
