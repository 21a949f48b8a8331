//! Road quality evaluation of a recorded or planned route.
//!
//! The route is cut into ~100 m segments, nearby roads are fetched once per group of
//! overlapping segment boxes, and each segment takes the class of the closest road.

use crate::provider::{ElevationProvider, RoadProvider};
use crate::report::{RouteAnalysis, DECENT_ROADS, EXCELLENT_ROADS, NO_ROAD_DATA, POOR_ROADS};
use crate::slope::enrich_route_elevation;
use crate::{AnalysisError, Result};
use grvlfinder_core::config::AnalysisConfig;
use grvlfinder_geo::{haversine_distance_meters, path_length_meters, BoundingBox, Coordinate};
use grvlfinder_scoring::{BikeProfile, Road, ScoreClass};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Segmenting and matching parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Target segment length in meters
    pub segment_length_m: f64,
    /// Buffer around each segment's bounds when fetching roads, in degrees
    pub bbox_buffer_deg: f64,
    /// Farthest a road point may be from a segment midpoint, in meters
    pub match_distance_m: f64,
    /// Look up elevation even when the profile does not ask for it
    pub force_elevation: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            segment_length_m: 100.0,
            bbox_buffer_deg: 0.02,
            match_distance_m: 200.0,
            force_elevation: false,
        }
    }
}

impl EvaluatorConfig {
    /// Build from the `[analysis]` section.
    #[must_use]
    pub fn from_settings(settings: &AnalysisConfig) -> Self {
        Self {
            segment_length_m: settings.segment_length_m,
            bbox_buffer_deg: settings.bbox_buffer_deg,
            match_distance_m: settings.match_distance_m,
            force_elevation: false,
        }
    }

    /// Force elevation lookup.
    #[must_use]
    pub fn with_force_elevation(mut self, force: bool) -> Self {
        self.force_elevation = force;
        self
    }
}

/// A piece of the route between two of its points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    /// First point
    pub start: Coordinate,
    /// Last point
    pub end: Coordinate,
    /// Straight-line length in meters
    pub distance_m: f64,
}

impl RouteSegment {
    fn new(start: Coordinate, end: Coordinate) -> Self {
        Self {
            start,
            end,
            distance_m: haversine_distance_meters(&start, &end),
        }
    }

    fn slope_percent(&self) -> Option<f64> {
        let a1 = self.start.elevation.unwrap_or(0.0);
        let a2 = self.end.elevation.unwrap_or(0.0);
        if (a1 == 0.0 && a2 == 0.0) || self.distance_m <= 0.0 {
            return None;
        }
        Some((a2 - a1).abs() / self.distance_m * 100.0)
    }

    fn bounds(&self, buffer_deg: f64) -> Option<BoundingBox> {
        BoundingBox::from_points(&[self.start, self.end]).map(|b| b.expanded(buffer_deg))
    }
}

/// Cut a route into segments of at least `segment_length_m`; the last one may be shorter.
#[must_use]
pub fn build_segments(points: &[Coordinate], segment_length_m: f64) -> Vec<RouteSegment> {
    let mut segments = Vec::new();
    let Some(first) = points.first() else {
        return segments;
    };

    let mut start = *first;
    let mut accumulated = 0.0;
    for (i, pair) in points.windows(2).enumerate() {
        accumulated += haversine_distance_meters(&pair[0], &pair[1]);
        let is_last = i + 2 == points.len();
        if accumulated >= segment_length_m || is_last {
            segments.push(RouteSegment::new(start, pair[1]));
            start = pair[1];
            accumulated = 0.0;
        }
    }
    segments
}

/// Evaluates routes against roads from a [`RoadProvider`].
pub struct RouteEvaluator<P> {
    provider: P,
    config: EvaluatorConfig,
}

impl<P: RoadProvider> RouteEvaluator<P> {
    /// Evaluator with default parameters.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: EvaluatorConfig::default(),
        }
    }

    /// Replace the parameters.
    #[must_use]
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Parameters in use.
    #[must_use]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate `points` for `profile`, reporting progress from 0 to 100.
    ///
    /// Elevation is looked up through `elevation` only when the route has none and the
    /// profile (or [`EvaluatorConfig::force_elevation`]) asks for it. Road fetch failures
    /// leave the affected segments without road data.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoRoutePoints`] for an empty route.
    #[instrument(skip_all, fields(points = points.len()))]
    pub async fn evaluate<E: ElevationProvider>(
        &self,
        points: &[Coordinate],
        profile: &BikeProfile,
        elevation: Option<&E>,
        mut progress: impl FnMut(u8),
    ) -> Result<RouteAnalysis> {
        if points.is_empty() {
            return Err(AnalysisError::NoRoutePoints);
        }
        progress(0);

        let mut analysis = RouteAnalysis::new(profile.bike_type());
        analysis.total_distance_km = path_length_meters(points) / 1000.0;
        analysis.has_elevation = points.iter().any(Coordinate::has_elevation);

        let mut route = points.to_vec();
        let wants_elevation = self.config.force_elevation || profile.should_fetch_elevation_data();
        if !analysis.has_elevation && wants_elevation {
            if let Some(provider) = elevation {
                match enrich_route_elevation(&mut route, provider).await {
                    Ok(enriched) => analysis.has_elevation = enriched,
                    Err(e) => warn!(error = %e, "Failed to fetch elevation data"),
                }
            }
        }

        let segments = build_segments(&route, self.config.segment_length_m);
        analysis.total_segments = segments.len();
        debug!(segments = segments.len(), "Route segmented");
        progress(10);

        if analysis.has_elevation {
            analyze_slopes(&segments, &mut analysis);
        }
        progress(25);

        let matched = self.analyze_roads(&segments, &mut analysis, &mut progress).await;
        analysis.finish(matched);
        progress(100);

        info!(
            distance_km = analysis.total_distance_km,
            coverage = analysis.coverage_percent,
            green = analysis.green_percent,
            "Route evaluated"
        );
        Ok(analysis)
    }

    async fn analyze_roads(
        &self,
        segments: &[RouteSegment],
        analysis: &mut RouteAnalysis,
        progress: &mut impl FnMut(u8),
    ) -> usize {
        let groups = group_segments(segments, self.config.bbox_buffer_deg);
        if groups.is_empty() {
            progress(90);
            return 0;
        }

        let total = groups.len();
        let mut fetched: HashMap<String, Vec<Road>> = HashMap::new();
        let mut matched = 0;

        for (done, (bbox, members)) in groups.iter().enumerate() {
            let key = bbox.cache_key();
            if !fetched.contains_key(&key) {
                let roads = match self.provider.fetch_roads(bbox).await {
                    Ok(roads) => roads,
                    Err(e) => {
                        warn!(bbox = %key, error = %e, "Failed to fetch roads");
                        Vec::new()
                    }
                };
                fetched.insert(key.clone(), roads);
            }
            let roads = fetched.get(&key).map_or(&[][..], Vec::as_slice);

            for &index in members {
                let segment = &segments[index];
                let km = segment.distance_m / 1000.0;
                match closest_road(segment, roads, self.config.match_distance_m) {
                    Some(road) => {
                        matched += 1;
                        let class_key = match ScoreClass::from_score(road.score) {
                            ScoreClass::Green => {
                                analysis.green_km += km;
                                EXCELLENT_ROADS
                            }
                            ScoreClass::Yellow => {
                                analysis.yellow_km += km;
                                DECENT_ROADS
                            }
                            ScoreClass::Red => {
                                analysis.red_km += km;
                                POOR_ROADS
                            }
                        };
                        analysis.add_breakdown(class_key, km);
                        if let Some(surface) = road.surface().map(str::trim).filter(|s| !s.is_empty()) {
                            analysis.add_breakdown(&surface.to_lowercase(), km);
                        }
                    }
                    None => {
                        analysis.unknown_km += km;
                        analysis.add_breakdown(NO_ROAD_DATA, km);
                    }
                }
            }

            let step = 30 + (done + 1) * 60 / total;
            progress(u8::try_from(step).unwrap_or(90));
        }

        matched
    }
}

fn analyze_slopes(segments: &[RouteSegment], analysis: &mut RouteAnalysis) {
    for segment in segments {
        let Some(slope) = segment.slope_percent() else {
            continue;
        };
        if slope > analysis.max_slope_percent {
            analysis.max_slope_percent = slope;
            analysis.steepest_point = Some(segment.start);
            analysis.steepest_location = format!(
                "{:.6}, {:.6}",
                segment.start.latitude, segment.start.longitude
            );
        }
    }
}

/// Segment indices grouped under the first overlapping buffered box.
fn group_segments(segments: &[RouteSegment], buffer_deg: f64) -> Vec<(BoundingBox, Vec<usize>)> {
    let mut groups: Vec<(BoundingBox, Vec<usize>)> = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let Some(bounds) = segment.bounds(buffer_deg) else {
            continue;
        };
        match groups.iter_mut().find(|(b, _)| b.intersects(&bounds)) {
            Some((_, members)) => members.push(index),
            None => groups.push((bounds, vec![index])),
        }
    }
    groups
}

/// Road with the point closest to the segment midpoint, if within `max_m`.
fn closest_road<'a>(segment: &RouteSegment, roads: &'a [Road], max_m: f64) -> Option<&'a Road> {
    let midpoint = segment.start.midpoint(&segment.end);
    let mut best: Option<(&Road, f64)> = None;
    for road in roads {
        for point in &road.points {
            let distance = haversine_distance_meters(&midpoint, point);
            if distance < max_m && best.is_none_or(|(_, d)| distance < d) {
                best = Some((road, distance));
            }
        }
    }
    best.map(|(road, _)| road)
}
