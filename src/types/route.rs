//! Route types

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Coordinates, StopId};

/// Meters to statute miles, as displayed on the schedule
pub const METERS_TO_MILES: f64 = 0.000621371;

pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Default deadline for a single directions request
pub const DEFAULT_DIRECTIONS_TIMEOUT: Duration = Duration::from_secs(15);

/// One travel segment between two consecutive points of the route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    /// Zero when the provider returned no distance for this leg
    pub distance_meters: u64,
    /// Zero when the provider returned no duration for this leg
    pub duration_seconds: u64,
}

impl RouteLeg {
    pub fn new(distance_meters: u64, duration_seconds: u64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
        }
    }
}

/// Route geometry as GeoJSON coordinates
/// Coordinates are in [longitude, latitude] order (GeoJSON standard)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    /// Array of [lng, lat] coordinates forming the route polyline
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    /// Create empty geometry (for fallback when no route available)
    pub fn empty() -> Self {
        Self { coordinates: vec![] }
    }

    /// Create geometry from a list of coordinates (straight lines)
    pub fn from_coordinates(coords: &[Coordinates]) -> Self {
        Self {
            coordinates: coords.iter().map(|c| [c.lng, c.lat]).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Warning about route data quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWarning {
    pub warning_type: String,
    pub message: String,
}

impl RouteWarning {
    pub const LEGS_INCOMPLETE: &'static str = "legs_incomplete";

    pub fn legs_incomplete(expected: usize, received: usize) -> Self {
        Self {
            warning_type: Self::LEGS_INCOMPLETE.to_string(),
            message: format!(
                "Provider returned {} of {} expected legs; totals are partial",
                received, expected
            ),
        }
    }
}

/// Aggregate of a route computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub legs: Vec<RouteLeg>,
    pub total_distance_miles: f64,
    pub total_duration_minutes: f64,
    /// Present only when optimization was requested and applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reordered_stop_ids: Option<Vec<StopId>>,
    pub geometry: RouteGeometry,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RouteWarning>,
}

impl RouteResult {
    /// Result for a route with fewer than two stops
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from provider legs, converting metric sums to display units
    pub fn from_legs(legs: Vec<RouteLeg>) -> Self {
        let total_meters: u64 = legs.iter().map(|l| l.distance_meters).sum();
        let total_seconds: u64 = legs.iter().map(|l| l.duration_seconds).sum();

        Self {
            total_distance_miles: total_meters as f64 * METERS_TO_MILES,
            total_duration_minutes: total_seconds as f64 / SECONDS_PER_MINUTE,
            legs,
            ..Default::default()
        }
    }
}

/// Explicit inputs of one routing operation (technician/day, flags, deadline)
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub technician_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    /// Ask the provider to reorder the waypoints
    pub optimize: bool,
    pub timeout: Duration,
    pub cancellation: CancellationToken,
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self {
            technician_id: None,
            date: None,
            optimize: false,
            timeout: DEFAULT_DIRECTIONS_TIMEOUT,
            cancellation: CancellationToken::new(),
        }
    }
}

impl RoutingContext {
    pub fn new(optimize: bool) -> Self {
        Self {
            optimize,
            ..Default::default()
        }
    }

    pub fn for_technician(mut self, technician_id: Uuid, date: NaiveDate) -> Self {
        self.technician_id = Some(technician_id);
        self.date = Some(date);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}
