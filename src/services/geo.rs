//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Order `points` greedily, always moving to the closest unvisited one.
/// Returns indices into `points`.
pub fn nearest_neighbor_order(start: &Coordinates, points: &[Coordinates]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut order = Vec::with_capacity(points.len());
    let mut current = *start;

    while !remaining.is_empty() {
        let (slot, _) = remaining
            .iter()
            .enumerate()
            .map(|(slot, &i)| (slot, haversine_distance(&current, &points[i])))
            .fold((0, f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            });
        let next = remaining.remove(slot);
        current = points[next];
        order.push(next);
    }

    order
}
