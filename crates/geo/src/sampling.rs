//! Track sampling for elevation lookups and straight-line fill-in.
//!
//! Elevation services are slow and rate limited, so roads and routes are reduced to
//! a handful of representative points before a lookup.

use crate::{haversine_distance_meters, interpolate, path_length_meters, Coordinate};
use serde::{Deserialize, Serialize};

/// A point sampled along a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Sampled position
    pub coordinate: Coordinate,
    /// Distance from the start of the polyline in meters
    pub distance_along_m: f64,
}

/// Number of elevation samples worth taking for a road of `length_m` meters.
///
/// | Length | Samples |
/// |---|---|
/// | < 100 m | 3 |
/// | < 500 m | max(4, len / 75) |
/// | otherwise | min(10, len / 100) |
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn elevation_sample_count(length_m: f64) -> usize {
    if length_m < 100.0 {
        3
    } else if length_m < 500.0 {
        ((length_m / 75.0) as usize).max(4)
    } else {
        ((length_m / 100.0) as usize).min(10)
    }
}

/// Samples `count` points evenly along `points`, each tagged with its along-track distance.
///
/// The final point of the polyline is appended when fewer than `count` samples were
/// produced or when the last sample is not the final point, so the result may hold
/// `count + 1` entries.
#[must_use]
pub fn sample_along(points: &[Coordinate], count: usize) -> Vec<SamplePoint> {
    let Some(last) = points.last() else {
        return Vec::new();
    };

    let total = path_length_meters(points);
    #[allow(clippy::cast_precision_loss)]
    let interval = total / (count.max(2) - 1) as f64;

    let mut samples: Vec<SamplePoint> = Vec::with_capacity(count + 1);
    let mut seg_start = 0.0;
    let mut next = 0.0;

    for pair in points.windows(2) {
        let (p1, p2) = (&pair[0], &pair[1]);
        let seg_len = haversine_distance_meters(p1, p2);
        let seg_end = seg_start + seg_len;

        while next <= seg_end && samples.len() < count {
            let coordinate = if next <= seg_start || seg_len == 0.0 {
                *p1
            } else {
                interpolate(p1, p2, (next - seg_start) / seg_len)
            };
            samples.push(SamplePoint {
                coordinate,
                distance_along_m: next,
            });

            if interval <= 0.0 {
                break;
            }
            next += interval;
        }

        seg_start = seg_end;
    }

    // within a centimeter counts as the same point
    let ends_on_last = samples
        .last()
        .is_some_and(|s| s.coordinate.distance_to(last) < 0.01);
    if samples.len() < count || !ends_on_last {
        samples.push(SamplePoint {
            coordinate: *last,
            distance_along_m: total,
        });
    }

    samples
}

/// Thins a route to points at least `spacing_m` apart, keeping both ends.
///
/// The spacing is stretched when needed so that no more than `max_points` are returned.
#[must_use]
pub fn resample_by_spacing(
    points: &[Coordinate],
    spacing_m: f64,
    max_points: usize,
) -> Vec<Coordinate> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() == 1 || max_points < 2 {
        return vec![*first];
    }

    let total = path_length_meters(points);
    #[allow(clippy::cast_precision_loss)]
    let spacing = spacing_m.max(total / (max_points - 1) as f64);

    let mut sampled = vec![*first];
    let mut accumulated = 0.0;
    let mut next = spacing;

    for pair in points.windows(2) {
        if sampled.len() >= max_points - 1 {
            break;
        }
        accumulated += haversine_distance_meters(&pair[0], &pair[1]);
        if accumulated >= next {
            sampled.push(pair[1]);
            next += spacing;
        }
    }

    if sampled.last() != Some(last) {
        sampled.push(*last);
    }

    sampled
}

/// Straight line from `a` (exclusive) to `b` (inclusive) with a point every `spacing_m`.
///
/// Always yields at least one point (`b`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn densify_line(a: &Coordinate, b: &Coordinate, spacing_m: f64) -> Vec<Coordinate> {
    let distance = haversine_distance_meters(a, b);
    let segments = if spacing_m > 0.0 {
        ((distance / spacing_m) as usize).max(1)
    } else {
        1
    };

    (1..=segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / segments as f64;
            interpolate(a, b, t)
        })
        .collect()
}
