//! Point-to-point routes that favour well-scored roads.

use crate::graph::{EdgeWeighting, RoadGraph};
use crate::{Result, RoutingError};
use grvlfinder_core::config::RoutingConfig;
use grvlfinder_geo::{path_length_meters, point_to_segment_distance, BoundingBox, Coordinate};
use grvlfinder_scoring::Road;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Default cap on nodes expanded by one search.
pub const DEFAULT_MAX_NODES: usize = 10_000;
/// Default distance within which start and end attach to the network.
pub const DEFAULT_SNAP_DISTANCE_M: f64 = 100.0;
/// Margin added around start and end when loading roads, as a fraction of the span.
pub const SEARCH_AREA_MARGIN: f64 = 0.2;
/// A route segment belongs to a road when its ends average less than this from it.
pub const MATCH_DISTANCE_M: f64 = 50.0;

/// Distance and surface figures of a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteMetrics {
    /// Route length in km
    pub total_distance_km: f64,
    /// km on gravel-like surfaces
    pub gravel_distance_km: f64,
    /// km on paved surfaces
    pub paved_distance_km: f64,
    /// Steepest slope of any road used
    pub max_slope_percent: f64,
    /// Start of the segment on the steepest road
    pub steepest_point: Option<Coordinate>,
}

impl RouteMetrics {
    /// Measure `route` against the roads it was built from.
    #[must_use]
    pub fn calculate(route: &[Coordinate], roads: &[Road]) -> Self {
        let mut metrics = Self::default();
        let mut gravel_m = 0.0;
        let mut paved_m = 0.0;

        for pair in route.windows(2) {
            let (p1, p2) = (&pair[0], &pair[1]);
            let length = p1.distance_to(p2);

            let Some(road) = matching_road(p1, p2, roads) else {
                continue;
            };
            if road.is_gravel_surface() {
                gravel_m += length;
            } else if road.is_paved_surface() {
                paved_m += length;
            }
            if let Some(slope) = road
                .max_slope_percent
                .filter(|s| *s > metrics.max_slope_percent)
            {
                metrics.max_slope_percent = slope;
                metrics.steepest_point = Some(*p1);
            }
        }

        metrics.total_distance_km = path_length_meters(route) / 1000.0;
        metrics.gravel_distance_km = gravel_m / 1000.0;
        metrics.paved_distance_km = paved_m / 1000.0;
        metrics
    }

    /// Four-line text summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1} km\nGravel: {:.1} km\nPaved: {:.1} km\nMax slope: {:.1}%",
            self.total_distance_km,
            self.gravel_distance_km,
            self.paved_distance_km,
            self.max_slope_percent
        )
    }
}

/// Road closest to the segment `p1`-`p2`, scored by the mean distance of both ends
/// to one road segment. `None` unless that mean is under [`MATCH_DISTANCE_M`].
#[must_use]
pub fn matching_road<'a>(p1: &Coordinate, p2: &Coordinate, roads: &'a [Road]) -> Option<&'a Road> {
    roads
        .iter()
        .flat_map(|road| {
            road.points.windows(2).map(move |seg| {
                let d1 = point_to_segment_distance(p1, &seg[0], &seg[1]);
                let d2 = point_to_segment_distance(p2, &seg[0], &seg[1]);
                ((d1 + d2) / 2.0, road)
            })
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .filter(|(distance, _)| *distance < MATCH_DISTANCE_M)
        .map(|(_, road)| road)
}

/// A computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartRoute {
    /// Start, the road nodes passed, then end
    pub points: Vec<Coordinate>,
    /// Distance and surface figures
    pub metrics: RouteMetrics,
}

/// A* router over scored roads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmartRouter {
    max_nodes: usize,
    snap_distance_m: f64,
}

impl Default for SmartRouter {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            snap_distance_m: DEFAULT_SNAP_DISTANCE_M,
        }
    }
}

impl SmartRouter {
    /// Router with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Router using the `[routing]` config section.
    #[must_use]
    pub fn from_settings(settings: &RoutingConfig) -> Self {
        Self {
            max_nodes: settings.max_nodes,
            snap_distance_m: settings.snap_distance_m,
        }
    }

    /// Set the search expansion cap.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set the endpoint snap distance.
    #[must_use]
    pub fn with_snap_distance(mut self, meters: f64) -> Self {
        self.snap_distance_m = meters;
        self
    }

    /// Area to load roads for: the box spanned by `start` and `end`, grown by
    /// [`SEARCH_AREA_MARGIN`] of its height and width on each side.
    #[must_use]
    pub fn search_area(start: &Coordinate, end: &Coordinate) -> BoundingBox {
        BoundingBox {
            south: start.latitude.min(end.latitude),
            west: start.longitude.min(end.longitude),
            north: start.latitude.max(end.latitude),
            east: start.longitude.max(end.longitude),
        }
        .expanded_by_fraction(SEARCH_AREA_MARGIN)
    }

    /// Route from `start` to `end` over `roads`.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::NoRoads`] when no road has at least two points
    /// - [`RoutingError::CannotConnect`] when an endpoint has no node within the snap distance
    /// - [`RoutingError::NoRoute`] when the search fails or hits its cap
    #[instrument(skip(self, roads), fields(roads = roads.len()))]
    pub fn route(&self, start: &Coordinate, end: &Coordinate, roads: &[Road]) -> Result<SmartRoute> {
        let graph = RoadGraph::build(roads, EdgeWeighting::ScoreWeighted);
        if graph.is_empty() {
            return Err(RoutingError::NoRoads);
        }

        let (Some(from), Some(to)) = (
            graph.nearest_node(start, self.snap_distance_m),
            graph.nearest_node(end, self.snap_distance_m),
        ) else {
            warn!(snap_m = self.snap_distance_m, "Endpoint too far from road network");
            return Err(RoutingError::CannotConnect);
        };

        let nodes = graph
            .astar(from, to, self.max_nodes)
            .ok_or(RoutingError::NoRoute)?;

        let mut points = Vec::with_capacity(nodes.len() + 2);
        points.push(*start);
        points.extend(nodes);
        points.push(*end);

        let metrics = RouteMetrics::calculate(&points, roads);
        info!(
            points = points.len(),
            km = metrics.total_distance_km,
            gravel_km = metrics.gravel_distance_km,
            "Smart route found"
        );
        Ok(SmartRoute { points, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grvlfinder_scoring::Tags;

    fn road(points: &[(f64, f64)], surface: &str, score: i32) -> Road {
        let mut tags = Tags::new();
        tags.insert("surface".to_string(), surface.to_string());
        let mut road = Road::new(
            points.iter().map(|&(lat, lon)| Coordinate::new(lat, lon)).collect(),
            tags,
        );
        road.score = score;
        road
    }

    fn network() -> Vec<Road> {
        let mut hill = road(&[(50.0, 4.002), (50.0, 4.004)], "asphalt", 5);
        hill.max_slope_percent = Some(9.5);
        vec![
            road(&[(50.0, 4.0), (50.0, 4.001), (50.0, 4.002)], "gravel", 40),
            hill,
        ]
    }

    #[test]
    fn test_route_wraps_nodes_with_endpoints() {
        let start = Coordinate::new(50.0001, 4.0);
        let end = Coordinate::new(50.0001, 4.004);
        let route = SmartRouter::new().route(&start, &end, &network()).unwrap();

        assert_eq!(route.points.first(), Some(&start));
        assert_eq!(route.points.last(), Some(&end));
        assert_eq!(route.points.len(), 6);
        assert_eq!(route.points[1], Coordinate::new(50.0, 4.0));
    }

    #[test]
    fn test_route_metrics() {
        let start = Coordinate::new(50.0, 4.0);
        let end = Coordinate::new(50.0, 4.004);
        let route = SmartRouter::new().route(&start, &end, &network()).unwrap();
        let m = &route.metrics;

        assert!((m.total_distance_km - 0.286).abs() < 0.01);
        assert!((m.gravel_distance_km - 0.143).abs() < 0.01);
        assert!((m.paved_distance_km - 0.143).abs() < 0.01);
        assert!((m.max_slope_percent - 9.5).abs() < 1e-9);
        assert_eq!(m.steepest_point, Some(Coordinate::new(50.0, 4.002)));
    }

    #[test]
    fn test_route_errors() {
        let router = SmartRouter::new();
        let start = Coordinate::new(50.0, 4.0);
        let end = Coordinate::new(50.0, 4.004);

        assert_eq!(router.route(&start, &end, &[]), Err(RoutingError::NoRoads));
        assert_eq!(
            router.route(&start, &Coordinate::new(51.0, 4.0), &network()),
            Err(RoutingError::CannotConnect)
        );

        let split = vec![
            road(&[(50.0, 4.0), (50.0, 4.001)], "gravel", 0),
            road(&[(50.0, 4.003), (50.0, 4.004)], "gravel", 0),
        ];
        assert_eq!(router.route(&start, &end, &split), Err(RoutingError::NoRoute));
        assert_eq!(
            router.with_max_nodes(1).route(&start, &end, &network()),
            Err(RoutingError::NoRoute)
        );
    }

    #[test]
    fn test_search_area_margin() {
        let area = SmartRouter::search_area(&Coordinate::new(51.0, 5.0), &Coordinate::new(50.0, 4.0));
        assert!((area.south - 49.8).abs() < 1e-9);
        assert!((area.north - 51.2).abs() < 1e-9);
        assert!((area.west - 3.8).abs() < 1e-9);
        assert!((area.east - 5.2).abs() < 1e-9);
    }

    #[test]
    fn test_matching_road_threshold() {
        let roads = network();
        let near = matching_road(
            &Coordinate::new(50.0002, 4.0),
            &Coordinate::new(50.0002, 4.001),
            &roads,
        );
        assert_eq!(near.and_then(Road::surface), Some("gravel"));

        let far = matching_road(
            &Coordinate::new(50.001, 4.0),
            &Coordinate::new(50.001, 4.001),
            &roads,
        );
        assert!(far.is_none());
    }

    #[test]
    fn test_summary_format() {
        let metrics = RouteMetrics {
            total_distance_km: 12.34,
            gravel_distance_km: 8.0,
            paved_distance_km: 4.26,
            max_slope_percent: 7.0,
            steepest_point: None,
        };
        assert_eq!(
            metrics.summary(),
            "Total: 12.3 km\nGravel: 8.0 km\nPaved: 4.3 km\nMax slope: 7.0%"
        );
    }
}
