//! Slopes from sampled elevations.
//!
//! SRTM data is noisy at short range, so slopes come from samples at least
//! [`MIN_SEGMENT_M`] apart and implausible values are dropped instead of clamped.

use crate::provider::ElevationProvider;
use crate::Result;
use grvlfinder_geo::{
    elevation_sample_count, haversine_distance_meters, resample_by_spacing, sample_along,
    Coordinate, SamplePoint,
};
use grvlfinder_scoring::Road;
use tracing::{debug, warn};

/// Shortest sample spacing used for a slope.
pub const MIN_SEGMENT_M: f64 = 20.0;
/// Slopes above this are treated as measurement errors.
pub const MAX_PLAUSIBLE_SLOPE: f64 = 40.0;
/// Reported slopes never exceed this.
pub const SLOPE_CAP: f64 = 35.0;
/// Spacing of route samples sent for elevation lookup.
pub const ROUTE_SAMPLE_SPACING_M: f64 = 50.0;
/// Most route samples sent for elevation lookup.
pub const ROUTE_MAX_SAMPLES: usize = 100;

const MIN_ELEVATION_M: f64 = -100.0;
const MAX_ELEVATION_M: f64 = 5000.0;

fn plausible_elevation(e: f64) -> bool {
    (MIN_ELEVATION_M..=MAX_ELEVATION_M).contains(&e)
}

/// Steepest slope in percent between consecutive samples, capped at [`SLOPE_CAP`].
///
/// Pairs with a NaN or out-of-range elevation, less than [`MIN_SEGMENT_M`] apart,
/// or with a slope above [`MAX_PLAUSIBLE_SLOPE`] are skipped. `None` when no pair
/// survives.
#[must_use]
pub fn max_slope_percent(samples: &[SamplePoint], elevations: &[f64]) -> Option<f64> {
    samples
        .windows(2)
        .zip(elevations.windows(2))
        .filter_map(|(s, e)| {
            let (e1, e2) = (e[0], e[1]);
            if e1.is_nan() || e2.is_nan() {
                return None;
            }
            if !plausible_elevation(e1) || !plausible_elevation(e2) {
                debug!(e1, e2, "Suspicious elevation values, skipping pair");
                return None;
            }
            let horizontal = s[1].distance_along_m - s[0].distance_along_m;
            if horizontal < MIN_SEGMENT_M {
                return None;
            }
            let slope = (e2 - e1).abs() / horizontal * 100.0;
            (0.0..=MAX_PLAUSIBLE_SLOPE).contains(&slope).then_some(slope)
        })
        .max_by(f64::total_cmp)
        .map(|max| max.min(SLOPE_CAP))
}

/// Give each point the elevation of its closest sample.
///
/// Leaves points untouched when there are no samples.
pub fn assign_nearest_elevation(points: &mut [Coordinate], samples: &[Coordinate], elevations: &[f64]) {
    for point in points.iter_mut() {
        let nearest = samples
            .iter()
            .zip(elevations)
            .map(|(s, e)| (haversine_distance_meters(point, s), *e))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, elevation)) = nearest {
            point.elevation = Some(elevation);
        }
    }
}

/// Elevation samples for one road.
#[must_use]
pub fn road_samples(road: &Road) -> Vec<SamplePoint> {
    sample_along(&road.points, elevation_sample_count(road.length_m()))
}

/// Set `max_slope_percent` on every road with one batched elevation lookup.
///
/// Roads without a usable pair keep `None`.
///
/// # Errors
///
/// Propagates the provider's error; roads are left unchanged in that case.
pub async fn enrich_roads_with_slope<E: ElevationProvider>(roads: &mut [Road], provider: &E) -> Result<()> {
    let per_road: Vec<Vec<SamplePoint>> = roads.iter().map(road_samples).collect();
    let all_points: Vec<Coordinate> = per_road
        .iter()
        .flat_map(|samples| samples.iter().map(|s| s.coordinate))
        .collect();
    if all_points.is_empty() {
        return Ok(());
    }

    let elevations = provider.elevations(&all_points).await?;
    if elevations.len() != all_points.len() {
        warn!(
            expected = all_points.len(),
            got = elevations.len(),
            "Elevation count mismatch"
        );
    }

    let mut offset = 0;
    for (road, samples) in roads.iter_mut().zip(&per_road) {
        let end = offset + samples.len();
        let road_elevations: Vec<f64> = (offset..end)
            .map(|i| elevations.get(i).copied().unwrap_or(f64::NAN))
            .collect();
        road.max_slope_percent = max_slope_percent(samples, &road_elevations);
        offset = end;
    }

    debug!(
        roads = roads.len(),
        samples = all_points.len(),
        with_slope = roads.iter().filter(|r| r.max_slope_percent.is_some()).count(),
        "Slope enrichment finished"
    );
    Ok(())
}

/// Fill in elevations of a route that has none.
///
/// Returns `false` without a lookup when any point already has a non-zero elevation.
///
/// # Errors
///
/// Propagates the provider's error.
pub async fn enrich_route_elevation<E: ElevationProvider>(
    points: &mut [Coordinate],
    provider: &E,
) -> Result<bool> {
    if points.is_empty() || points.iter().any(Coordinate::has_elevation) {
        return Ok(false);
    }

    let samples = resample_by_spacing(points, ROUTE_SAMPLE_SPACING_M, ROUTE_MAX_SAMPLES);
    let elevations = provider.elevations(&samples).await?;
    assign_nearest_elevation(points, &samples, &elevations);

    debug!(
        points = points.len(),
        samples = samples.len(),
        "Route elevation enriched"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use grvlfinder_api_client::ApiError;
    use grvlfinder_scoring::Tags;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::block_on;

    fn samples(distances: &[f64]) -> Vec<SamplePoint> {
        distances
            .iter()
            .map(|d| SamplePoint {
                coordinate: Coordinate::new(50.0, 4.0),
                distance_along_m: *d,
            })
            .collect()
    }

    /// Elevation rises linearly with longitude.
    struct Ramp {
        meters_per_degree: f64,
        calls: AtomicUsize,
    }

    impl ElevationProvider for Ramp {
        async fn elevations(&self, points: &[Coordinate]) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(points
                .iter()
                .map(|p| (p.longitude - 4.0) * self.meters_per_degree)
                .collect())
        }
    }

    struct Failing;

    impl ElevationProvider for Failing {
        async fn elevations(&self, _points: &[Coordinate]) -> Result<Vec<f64>> {
            Err(AnalysisError::Api(ApiError::unexpected("down")))
        }
    }

    fn ramp(meters_per_degree: f64) -> Ramp {
        Ramp {
            meters_per_degree,
            calls: AtomicUsize::new(0),
        }
    }

    /// East-west road of `n` points spaced ~70 m.
    fn road(n: usize) -> Road {
        let points = (0..n)
            .map(|i| Coordinate::new(50.0, 4.0 + f64::from(u32::try_from(i).unwrap()) * 0.001))
            .collect();
        Road::new(points, Tags::new())
    }

    #[test]
    fn test_max_slope_basic() {
        let s = samples(&[0.0, 100.0, 200.0]);
        let slope = max_slope_percent(&s, &[10.0, 15.0, 13.0]).unwrap();
        assert!((slope - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_slope_skips_short_and_bad_pairs() {
        let s = samples(&[0.0, 10.0, 110.0, 210.0]);
        // 0-10 m is too short; 110-210 has an impossible elevation
        let slope = max_slope_percent(&s, &[0.0, 50.0, 52.0, 6000.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-9);

        assert_eq!(max_slope_percent(&s[..2], &[0.0, 1.0]), None);
        assert_eq!(max_slope_percent(&s[1..3], &[f64::NAN, 1.0]), None);
    }

    #[test]
    fn test_max_slope_drops_implausible_and_caps() {
        let s = samples(&[0.0, 100.0, 200.0]);
        assert_eq!(max_slope_percent(&s, &[0.0, 50.0, 100.0]), None);
        assert_eq!(max_slope_percent(&s, &[0.0, 38.0, 38.0]), Some(SLOPE_CAP));
    }

    #[test]
    fn test_assign_nearest_elevation() {
        let mut points = vec![
            Coordinate::new(50.0, 4.0),
            Coordinate::new(50.0, 4.0004),
            Coordinate::new(50.0, 4.001),
        ];
        let sample_points = [Coordinate::new(50.0, 4.0), Coordinate::new(50.0, 4.001)];
        assign_nearest_elevation(&mut points, &sample_points, &[10.0, 20.0]);

        assert_eq!(points[0].elevation, Some(10.0));
        assert_eq!(points[1].elevation, Some(10.0));
        assert_eq!(points[2].elevation, Some(20.0));

        let mut untouched = vec![Coordinate::new(50.0, 4.0)];
        assign_nearest_elevation(&mut untouched, &[], &[]);
        assert_eq!(untouched[0].elevation, None);
    }

    #[test]
    fn test_enrich_roads_one_lookup() {
        // ~7 m rise per 70 m step = ~10 %
        let provider = ramp(10_000.0);
        let mut roads = vec![road(8), road(3)];
        block_on(enrich_roads_with_slope(&mut roads, &provider)).unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        for r in &roads {
            let slope = r.max_slope_percent.unwrap();
            assert!((slope - 14.0).abs() < 1.0, "slope {slope}");
        }
    }

    #[test]
    fn test_enrich_roads_propagates_failure() {
        let mut roads = vec![road(4)];
        assert!(block_on(enrich_roads_with_slope(&mut roads, &Failing)).is_err());
        assert_eq!(roads[0].max_slope_percent, None);
    }

    #[test]
    fn test_enrich_route_elevation() {
        let provider = ramp(1_000.0);
        let mut points = road(20).points;
        let enriched = block_on(enrich_route_elevation(&mut points, &provider)).unwrap();

        assert!(enriched);
        assert!(points.iter().all(|p| p.elevation.is_some()));
        assert_eq!(points[0].elevation, Some(0.0));
    }

    #[test]
    fn test_enrich_route_skips_when_elevation_present() {
        let provider = ramp(1_000.0);
        let mut points = road(5).points;
        points[2].elevation = Some(42.0);
        let enriched = block_on(enrich_route_elevation(&mut points, &provider)).unwrap();

        assert!(!enriched);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
