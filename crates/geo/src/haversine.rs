//! Great-circle distances on a spherical earth.
//!
//! Ride-scale distances (a few meters up to a few hundred kilometers) are what the
//! rest of the workspace measures, so meters are the primary unit here.

use crate::Coordinate;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = EARTH_RADIUS_M / 1000.0;

/// Central angle between two coordinates in radians. Elevation is ignored.
#[inline]
fn central_angle(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let half_dlat = ((lat2 - lat1) / 2.0).sin();
    let half_dlon = ((lon2 - lon1) / 2.0).sin();
    let h = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;

    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distance between two coordinates in meters.
///
/// ```
/// use grvlfinder_geo::{haversine_distance_meters, Coordinate};
///
/// // One thousandth of a degree of latitude
/// let a = Coordinate::new(50.880, 4.700);
/// let b = Coordinate::new(50.881, 4.700);
/// assert!((haversine_distance_meters(&a, &b) - 111.2).abs() < 0.5);
/// ```
#[inline]
#[must_use]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    EARTH_RADIUS_M * central_angle(from, to)
}

/// Distance between two coordinates in kilometers.
#[inline]
#[must_use]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    EARTH_RADIUS_KM * central_angle(from, to)
}

/// Sum of the leg lengths of a track, in meters. Zero for fewer than two points.
#[must_use]
pub fn path_length_meters(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|leg| haversine_distance_meters(&leg[0], &leg[1]))
        .sum()
}

/// Equirectangular distance in kilometers.
///
/// Within a fraction of a percent of [`haversine_distance`] over the span of one
/// Overpass query, and cheaper to compute.
#[inline]
#[must_use]
pub fn approximate_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;
    x.hypot(y) * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEUVEN: Coordinate = Coordinate::new(50.8798, 4.7005);
    const BRUSSELS: Coordinate = Coordinate::new(50.8503, 4.3517);
    const NAMUR: Coordinate = Coordinate::new(50.4674, 4.8720);

    #[test]
    fn test_leuven_to_brussels() {
        let km = haversine_distance(&LEUVEN, &BRUSSELS);
        assert!((km - 24.7).abs() < 0.5, "Leuven-Brussels: {km}");
    }

    #[test]
    fn test_units_agree() {
        let km = haversine_distance(&LEUVEN, &NAMUR);
        let m = haversine_distance_meters(&LEUVEN, &NAMUR);
        assert!((m - km * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_and_symmetric() {
        assert!(haversine_distance_meters(&LEUVEN, &LEUVEN).abs() < 1e-9);
        let there = haversine_distance_meters(&LEUVEN, &NAMUR);
        let back = haversine_distance_meters(&NAMUR, &LEUVEN);
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let equator = haversine_distance_meters(&Coordinate::new(0.0, 4.0), &Coordinate::new(0.0, 4.001));
        let belgium = haversine_distance_meters(&Coordinate::new(50.0, 4.0), &Coordinate::new(50.0, 4.001));
        assert!((belgium / equator - 50f64.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn test_path_length() {
        assert_eq!(path_length_meters(&[]), 0.0);
        assert_eq!(path_length_meters(&[LEUVEN]), 0.0);

        let direct = haversine_distance_meters(&BRUSSELS, &NAMUR);
        let via_leuven = path_length_meters(&[BRUSSELS, LEUVEN, NAMUR]);
        assert!(via_leuven > direct);
    }

    #[test]
    fn test_elevation_is_ignored() {
        let summit = LEUVEN.with_elevation(300.0);
        assert_eq!(
            haversine_distance_meters(&summit, &BRUSSELS),
            haversine_distance_meters(&LEUVEN, &BRUSSELS)
        );
    }

    #[test]
    fn test_approximation_is_close_at_ride_scale() {
        let exact = haversine_distance(&LEUVEN, &NAMUR);
        let approx = approximate_distance(&LEUVEN, &NAMUR);
        assert!(((approx - exact) / exact).abs() < 0.001);
    }
}
