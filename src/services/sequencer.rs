//! Route sequencing: directions request, waypoint-order reconciliation and
//! distance/duration aggregation for one technician/day.
//!
//! The provider's waypoint order indexes the *middle* stops only; the first and
//! last stop are fixed endpoints. `compute_route` makes a single attempt;
//! `compute_route_with_retries` layers the retry policy on top of it.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::error::{DirectionsError, RouteError};
use crate::services::directions::{DirectionsClient, DirectionsRequest};
use crate::services::stop_set::StopSet;
use crate::types::{Location, RouteResult, RouteWarning, RoutingContext, StopId};

/// Outcome of a route computation: the resequenced stops and the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub stops: StopSet,
    pub result: RouteResult,
}

/// Stateless orchestrator; see module docs
pub struct RouteSequencer;

impl RouteSequencer {
    /// Compute the route for `stop_set` without mutating it.
    ///
    /// Sets of fewer than two stops yield an empty result and no provider call.
    pub async fn compute_route(
        stop_set: &StopSet,
        client: &dyn DirectionsClient,
        context: &RoutingContext,
    ) -> Result<RoutePlan, RouteError> {
        let (first, last) = match (stop_set.first(), stop_set.last()) {
            (Some(first), Some(last)) if stop_set.len() >= 2 => (first, last),
            _ => {
                return Ok(RoutePlan {
                    stops: stop_set.clone(),
                    result: RouteResult::empty(),
                })
            }
        };

        let middle = stop_set.middle();
        let request = DirectionsRequest {
            origin: Location::Coordinates(first.coordinates),
            destination: Location::Coordinates(last.coordinates),
            waypoints: middle.iter().map(|s| s.coordinates).collect(),
            optimize: context.optimize,
        };

        let outcome = tokio::select! {
            biased;
            _ = context.cancellation.cancelled() => return Err(DirectionsError::Cancelled.into()),
            outcome = tokio::time::timeout(context.timeout, client.route(&request)) => outcome,
        };
        let response = match outcome {
            Ok(response) => response?,
            Err(_) => return Err(DirectionsError::Timeout(context.timeout).into()),
        };
        // A response racing a cancellation must not be applied
        if context.cancellation.is_cancelled() {
            return Err(DirectionsError::Cancelled.into());
        }

        let expected_legs = stop_set.len() - 1;
        let mut result = RouteResult::from_legs(response.legs);
        result.geometry = response.geometry;
        if result.legs.len() < expected_legs {
            result
                .warnings
                .push(RouteWarning::legs_incomplete(expected_legs, result.legs.len()));
        }

        let mut stops = stop_set.clone();
        if context.optimize {
            if let Some(order) = response.waypoint_order {
                let new_order = reconstruct_order(stop_set, &order)?;
                stops
                    .apply_order(&new_order)
                    .map_err(|e| RouteError::Reconciliation(e.to_string()))?;
                result.reordered_stop_ids = Some(new_order);
            }
        }

        Ok(RoutePlan { stops, result })
    }

    /// Retry retryable directions failures up to `retries` times, waiting
    /// `attempt` seconds between tries. Rejections and reconciliation errors are
    /// returned at once; cancellation also ends the backoff.
    pub async fn compute_route_with_retries(
        stop_set: &StopSet,
        client: &dyn DirectionsClient,
        context: &RoutingContext,
        retries: u32,
    ) -> Result<RoutePlan, RouteError> {
        let mut attempt = 0;
        loop {
            match Self::compute_route(stop_set, client, context).await {
                Err(RouteError::Directions(e))
                    if e.is_retryable()
                        && attempt < retries
                        && !context.cancellation.is_cancelled() =>
                {
                    attempt += 1;
                    warn!("Directions attempt {} failed ({}), retrying", attempt, e);
                    tokio::select! {
                        biased;
                        _ = context.cancellation.cancelled() => {
                            return Err(DirectionsError::Cancelled.into())
                        }
                        _ = tokio::time::sleep(Duration::from_secs(u64::from(attempt))) => {}
                    }
                }
                outcome => return outcome,
            }
        }
    }
}

/// `[first] + middle permuted by order + [last]`, after checking that `order` is
/// a permutation of `0..middle.len()`
fn reconstruct_order(stop_set: &StopSet, order: &[usize]) -> Result<Vec<StopId>, RouteError> {
    let middle = stop_set.middle();
    if order.len() != middle.len() {
        return Err(RouteError::Reconciliation(format!(
            "provider returned {} waypoint indices for {} waypoints",
            order.len(),
            middle.len()
        )));
    }

    let mut seen = HashSet::with_capacity(order.len());
    for &index in order {
        if index >= middle.len() {
            return Err(RouteError::Reconciliation(format!(
                "waypoint index {} out of range",
                index
            )));
        }
        if !seen.insert(index) {
            return Err(RouteError::Reconciliation(format!(
                "waypoint index {} repeated",
                index
            )));
        }
    }

    let mut ids = Vec::with_capacity(stop_set.len());
    ids.extend(stop_set.first().map(|s| s.id.clone()));
    ids.extend(order.iter().map(|&i| middle[i].id.clone()));
    ids.extend(stop_set.last().map(|s| s.id.clone()));
    Ok(ids)
}
