//! Ordered set of stops for one technician/day.
//!
//! Sequences are always the contiguous range `1..=n` in vector order. The set is
//! built fresh for every routing operation and discarded once the caller has
//! persisted (or abandoned) the new order.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::StopSetError;
use crate::types::{Coordinates, Stop, StopId, StopInput};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StopSet {
    stops: Vec<Stop>,
}

impl StopSet {
    /// Build a set from caller data.
    ///
    /// When every item carries a sequence the items are ordered by it (ties keep
    /// list order); otherwise list order is the visiting order. Sequences are then
    /// renumbered `1..=n`.
    pub fn from_ordered_list(items: Vec<StopInput>) -> Result<Self, StopSetError> {
        let mut seen = HashSet::with_capacity(items.len());
        let mut indexed = Vec::with_capacity(items.len());

        for (position, item) in items.into_iter().enumerate() {
            let coordinates = match (item.lat, item.lng) {
                (Some(lat), Some(lng)) => Coordinates { lat, lng },
                _ => return Err(StopSetError::InvalidStop { id: item.id }),
            };
            if !coordinates.is_valid() {
                return Err(StopSetError::InvalidStop { id: item.id });
            }
            if !seen.insert(item.id.clone()) {
                return Err(StopSetError::DuplicateStopId { id: item.id });
            }
            indexed.push((item.sequence, position, item.id, coordinates));
        }

        if indexed.iter().all(|(sequence, ..)| sequence.is_some()) {
            indexed.sort_by_key(|(sequence, position, ..)| (*sequence, *position));
        }

        let stops = indexed
            .into_iter()
            .enumerate()
            .map(|(i, (_, _, id, coordinates))| Stop {
                id,
                coordinates,
                sequence: i as u32 + 1,
            })
            .collect();

        Ok(Self { stops })
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn first(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Every stop except the first and the last, in sequence order (the waypoints)
    pub fn middle(&self) -> &[Stop] {
        if self.stops.len() < 3 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }

    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| &s.id == id)
    }

    pub fn ids(&self) -> Vec<StopId> {
        self.stops.iter().map(|s| s.id.clone()).collect()
    }

    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.stops.iter().map(|s| s.coordinates).collect()
    }

    /// Renumber every stop so that its 1-based position in `new_order` becomes its
    /// sequence. The order is validated in full before anything changes.
    pub fn apply_order(&mut self, new_order: &[StopId]) -> Result<(), StopSetError> {
        if new_order.len() != self.stops.len() {
            return Err(StopSetError::PermutationMismatch {
                reason: format!(
                    "expected {} ids, got {}",
                    self.stops.len(),
                    new_order.len()
                ),
            });
        }

        let mut positions = Vec::with_capacity(new_order.len());
        let mut used = vec![false; self.stops.len()];
        for id in new_order {
            let index = self
                .stops
                .iter()
                .position(|s| &s.id == id)
                .ok_or_else(|| StopSetError::PermutationMismatch {
                    reason: format!("unknown stop id {}", id),
                })?;
            if used[index] {
                return Err(StopSetError::PermutationMismatch {
                    reason: format!("stop id {} repeated", id),
                });
            }
            used[index] = true;
            positions.push(index);
        }

        let mut reordered: Vec<Stop> = positions
            .into_iter()
            .map(|i| self.stops[i].clone())
            .collect();
        for (i, stop) in reordered.iter_mut().enumerate() {
            stop.sequence = i as u32 + 1;
        }
        self.stops = reordered;

        Ok(())
    }
}
