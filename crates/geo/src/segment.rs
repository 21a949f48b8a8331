//! Point/segment geometry on small scales.
//!
//! Projection is done in plain lon/lat space, which is accurate enough for road
//! segments a few hundred meters long.

use crate::Coordinate;

/// Closest point to `p` on the segment `a`-`b`.
///
/// A degenerate segment (`a == b`) returns `a`.
#[must_use]
pub fn closest_point_on_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> Coordinate {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return *a;
    }

    let t = ((p.longitude - a.longitude) * dx + (p.latitude - a.latitude) * dy) / len_sq;
    interpolate(a, b, t.clamp(0.0, 1.0))
}

/// Distance in meters from `p` to the segment `a`-`b`.
#[must_use]
pub fn point_to_segment_distance(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    p.distance_to(&closest_point_on_segment(p, a, b))
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
///
/// Elevation is interpolated when both ends carry one.
#[must_use]
pub fn interpolate(a: &Coordinate, b: &Coordinate, t: f64) -> Coordinate {
    Coordinate {
        latitude: a.latitude + t * (b.latitude - a.latitude),
        longitude: a.longitude + t * (b.longitude - a.longitude),
        elevation: a
            .elevation
            .zip(b.elevation)
            .map(|(ea, eb)| ea + t * (eb - ea)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_projection_inside_segment() {
        let a = Coordinate::new(50.0, 4.0);
        let b = Coordinate::new(50.0, 4.01);
        let p = Coordinate::new(50.001, 4.005);

        let c = closest_point_on_segment(&p, &a, &b);
        assert!((c.latitude - 50.0).abs() < 1e-12);
        assert!((c.longitude - 4.005).abs() < 1e-12);
        assert!((point_to_segment_distance(&p, &a, &b) - 111.2).abs() < 1.0);
    }

    #[test]
    fn test_projection_clamped_to_ends() {
        let a = Coordinate::new(50.0, 4.0);
        let b = Coordinate::new(50.0, 4.01);

        let before = Coordinate::new(50.0, 3.99);
        assert_eq!(closest_point_on_segment(&before, &a, &b), a);

        let after = Coordinate::new(50.0, 4.02);
        assert_eq!(closest_point_on_segment(&after, &a, &b), b);
    }

    #[test]
    fn test_degenerate_segment_returns_start() {
        let a = Coordinate::new(50.0, 4.0);
        let p = Coordinate::new(50.01, 4.01);
        assert_eq!(closest_point_on_segment(&p, &a, &a), a);
    }

    #[test]
    fn test_interpolate_elevation() {
        let a = Coordinate::new(50.0, 4.0).with_elevation(100.0);
        let b = Coordinate::new(51.0, 5.0).with_elevation(200.0);
        let mid = interpolate(&a, &b, 0.25);
        assert_eq!(mid.elevation, Some(125.0));
        assert!((mid.latitude - 50.25).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_segment_distance_bounded_by_farthest_end(
            lat in 50.0f64..51.0, lon in 4.0f64..5.0,
            dlat in -0.01f64..0.01, dlon in -0.01f64..0.01,
            plat in -0.01f64..0.01, plon in -0.01f64..0.01,
        ) {
            let a = Coordinate::new(lat, lon);
            let b = Coordinate::new(lat + dlat, lon + dlon);
            let p = Coordinate::new(lat + plat, lon + plon);

            let d = point_to_segment_distance(&p, &a, &b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= p.distance_to(&a).max(p.distance_to(&b)) + 1.0);
        }
    }
}
