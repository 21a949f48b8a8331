//! Batch distance calculations with optional parallelism.
//!
//! Road graphs hold thousands of nodes and nearest-node lookups scan all of them, so
//! the scan runs on rayon when the `parallel` feature is enabled.

use crate::{haversine_distance_meters, Coordinate};
use serde::{Deserialize, Serialize};

/// Distance from an origin to one point of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Index of the point in the input slice
    pub index: usize,
    /// Distance in meters
    pub distance_m: f64,
}

/// Distances from `origin` to every point, in input order.
///
/// # Example
/// ```
/// use grvlfinder_geo::{distances_from, Coordinate};
///
/// let origin = Coordinate::new(50.88, 4.70);
/// let points = [Coordinate::new(50.88, 4.70), Coordinate::new(50.89, 4.70)];
///
/// let results = distances_from(&origin, &points);
/// assert_eq!(results.len(), 2);
/// assert!(results[0].distance_m < 1e-6);
/// ```
#[must_use]
pub fn distances_from(origin: &Coordinate, points: &[Coordinate]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .enumerate()
            .map(|(index, p)| distance_result(origin, index, p))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .enumerate()
            .map(|(index, p)| distance_result(origin, index, p))
            .collect()
    }
}

/// Closest point to `origin` that is strictly nearer than `max_m` meters.
///
/// Ties keep the lowest index.
#[must_use]
pub fn nearest_within(
    origin: &Coordinate,
    points: &[Coordinate],
    max_m: f64,
) -> Option<DistanceResult> {
    distances_from(origin, points)
        .into_iter()
        .filter(|r| r.distance_m < max_m)
        .min_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then(a.index.cmp(&b.index))
        })
}

#[inline]
fn distance_result(origin: &Coordinate, index: usize, point: &Coordinate) -> DistanceResult {
    DistanceResult {
        index,
        distance_m: haversine_distance_meters(origin, point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(50.8798, 4.7005), // Leuven
            Coordinate::new(50.8503, 4.3517), // Brussels
            Coordinate::new(51.2194, 4.4025), // Antwerp
        ]
    }

    #[test]
    fn test_batch_distances_in_order() {
        let origin = Coordinate::new(50.8798, 4.7005);
        let results = distances_from(&origin, &points());

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].index, 1);
        assert!(results[0].distance_m < 1e-6);
        assert!(results[1].distance_m > 20_000.0 && results[1].distance_m < 30_000.0);
    }

    #[test]
    fn test_nearest_within() {
        let origin = Coordinate::new(50.86, 4.36);
        let nearest = nearest_within(&origin, &points(), 5_000.0).unwrap();
        assert_eq!(nearest.index, 1);

        assert!(nearest_within(&origin, &points(), 100.0).is_none());
        assert!(nearest_within(&origin, &[], 1e9).is_none());
    }
}
