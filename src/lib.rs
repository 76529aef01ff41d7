//! Poolroute - route sequencing for pool-service technicians
//!
//! Orders a technician's stops for one day through a driving-directions
//! provider, reconciles the provider's waypoint order onto the stops and
//! aggregates leg distance and duration for display.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use error::{DirectionsError, DirectionsErrorKind, RouteError, StopSetError};
pub use services::directions::{
    create_directions_client, DirectionsClient, DirectionsConfig, DirectionsRequest,
    DirectionsResponse, GoogleDirectionsClient, MockDirectionsClient, ProxyDirectionsClient,
};
pub use services::sequencer::{RoutePlan, RouteSequencer};
pub use services::stop_set::StopSet;
pub use types::*;
