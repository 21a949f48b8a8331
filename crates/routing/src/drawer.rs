//! Hand-drawn routes that follow the road network between tapped points.

use crate::graph::{EdgeWeighting, RoadGraph};
use grvlfinder_core::config::RoutingConfig;
use grvlfinder_geo::{closest_point_on_segment, densify_line, Coordinate};
use grvlfinder_scoring::Road;
use tracing::debug;

/// Taps further than this from every road are kept where they are.
pub const DEFAULT_SNAP_DISTANCE_M: f64 = 500.0;
/// Route points must be within this of a node to be routed over the network.
pub const DEFAULT_NODE_DISTANCE_M: f64 = 150.0;
/// Search expansion cap between two taps.
pub const DEFAULT_MAX_EXPANSIONS: usize = 5_000;
/// Spacing of straight-line fallback points.
pub const DENSIFY_SPACING_M: f64 = 30.0;
/// Undo stops after the first point further than this from the route end.
pub const UNDO_DISTANCE_M: f64 = 300.0;
/// Most points removed by one undo.
pub const UNDO_MAX_POINTS: usize = 100;

/// Builds a route point by point.
#[derive(Debug, Clone)]
pub struct RouteDrawer {
    roads: Vec<Road>,
    graph: Option<RoadGraph>,
    points: Vec<Coordinate>,
    snap_distance_m: f64,
    node_distance_m: f64,
    max_expansions: usize,
}

impl Default for RouteDrawer {
    fn default() -> Self {
        Self {
            roads: Vec::new(),
            graph: None,
            points: Vec::new(),
            snap_distance_m: DEFAULT_SNAP_DISTANCE_M,
            node_distance_m: DEFAULT_NODE_DISTANCE_M,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

impl RouteDrawer {
    /// Drawer without roads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawer using the `[routing]` config section.
    #[must_use]
    pub fn from_settings(settings: &RoutingConfig) -> Self {
        Self {
            snap_distance_m: settings.draw_snap_m,
            node_distance_m: settings.draw_node_m,
            max_expansions: settings.draw_max_iterations,
            ..Self::default()
        }
    }

    /// Replace the roads used for snapping and path finding.
    pub fn set_roads(&mut self, roads: Vec<Road>) {
        self.graph = (!roads.is_empty()).then(|| RoadGraph::build(&roads, EdgeWeighting::Distance));
        self.roads = roads;
    }

    /// Closest point on any road within the snap distance, else `point` itself.
    #[must_use]
    pub fn snap_to_road(&self, point: &Coordinate) -> Coordinate {
        self.roads
            .iter()
            .flat_map(|road| road.points.windows(2))
            .map(|seg| {
                let projected = closest_point_on_segment(point, &seg[0], &seg[1]);
                (point.distance_to(&projected), projected)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .filter(|(distance, _)| *distance <= self.snap_distance_m)
            .map_or(*point, |(_, projected)| projected)
    }

    /// Snap `point` and extend the route to it. Returns the snapped point.
    ///
    /// The first point only starts the route. Later points follow the road network
    /// from the current end when both ends are near a node and a path exists,
    /// otherwise a straight line is added.
    pub fn add_point(&mut self, point: &Coordinate) -> Coordinate {
        let snapped = self.snap_to_road(point);
        let Some(last) = self.points.last().copied() else {
            self.points.push(snapped);
            return snapped;
        };

        match self.network_path(&last, &snapped) {
            Some(path) => {
                debug!(points = path.len(), "Following road network");
                for p in path {
                    if self.points.last().is_none_or(|l| l.node_key() != p.node_key()) {
                        self.points.push(p);
                    }
                }
            }
            None => {
                debug!("No network path, drawing straight line");
                self.points
                    .extend(densify_line(&last, &snapped, DENSIFY_SPACING_M));
            }
        }
        snapped
    }

    fn network_path(&self, from: &Coordinate, to: &Coordinate) -> Option<Vec<Coordinate>> {
        let graph = self.graph.as_ref()?;
        let start = graph.nearest_node(from, self.node_distance_m)?;
        let end = graph.nearest_node(to, self.node_distance_m)?;
        graph
            .astar(start, end, self.max_expansions)
            .filter(|path| path.len() > 1)
    }

    /// Remove the last drawn stretch. Returns the number of points removed.
    ///
    /// Walks back from the second-to-last point, counting each point, and stops after
    /// the first one more than [`UNDO_DISTANCE_M`] from the route end or after
    /// [`UNDO_MAX_POINTS`]. A single-point route is cleared.
    pub fn undo(&mut self) -> usize {
        let len = self.points.len();
        if len <= 1 {
            self.points.clear();
            return len;
        }

        let end = self.points[len - 1];
        let mut remove = 0;
        for p in self.points[..len - 1].iter().rev() {
            if remove >= UNDO_MAX_POINTS {
                break;
            }
            remove += 1;
            if p.distance_to(&end) > UNDO_DISTANCE_M {
                break;
            }
        }

        self.points.truncate(len - remove);
        remove
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// True once a point has been added.
    #[must_use]
    pub fn has_route(&self) -> bool {
        !self.points.is_empty()
    }

    /// Drawn points.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grvlfinder_scoring::Tags;

    /// East-west road at latitude 50 with vertices every ~72 m.
    fn drawer_with_road(vertices: u32) -> RouteDrawer {
        let points = (0..vertices)
            .map(|i| Coordinate::new(50.0, 4.0 + f64::from(i) * 0.001))
            .collect();
        let mut drawer = RouteDrawer::new();
        drawer.set_roads(vec![Road::new(points, Tags::new())]);
        drawer
    }

    #[test]
    fn test_snap_to_road() {
        let drawer = drawer_with_road(3);
        let snapped = drawer.snap_to_road(&Coordinate::new(50.001, 4.0015));
        assert!((snapped.latitude - 50.0).abs() < 1e-12);
        assert!((snapped.longitude - 4.0015).abs() < 1e-12);

        let far = Coordinate::new(50.01, 4.001);
        assert_eq!(drawer.snap_to_road(&far), far);
        assert_eq!(RouteDrawer::new().snap_to_road(&far), far);
    }

    #[test]
    fn test_first_point_starts_route() {
        let mut drawer = drawer_with_road(3);
        assert!(!drawer.has_route());

        let snapped = drawer.add_point(&Coordinate::new(50.0002, 4.0));
        assert_eq!(snapped, Coordinate::new(50.0, 4.0));
        assert_eq!(drawer.points(), &[Coordinate::new(50.0, 4.0)]);
        assert!(drawer.has_route());
    }

    #[test]
    fn test_second_point_follows_network_without_duplicates() {
        let mut drawer = drawer_with_road(5);
        drawer.add_point(&Coordinate::new(50.0, 4.0));
        drawer.add_point(&Coordinate::new(50.0, 4.004));

        let lons: Vec<f64> = drawer.points().iter().map(|p| p.longitude).collect();
        assert_eq!(lons.len(), 5);
        for (i, lon) in lons.iter().enumerate() {
            let expected = 4.0 + f64::from(u32::try_from(i).unwrap()) * 0.001;
            assert!((lon - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_straight_line_fallback() {
        let mut drawer = RouteDrawer::new();
        drawer.add_point(&Coordinate::new(50.0, 4.0));
        drawer.add_point(&Coordinate::new(50.0, 4.003));

        // ~214 m at 30 m spacing
        assert_eq!(drawer.points().len(), 8);
        assert_eq!(drawer.points().last(), Some(&Coordinate::new(50.0, 4.003)));
    }

    #[test]
    fn test_undo_removes_last_stretch() {
        let mut drawer = RouteDrawer::new();
        drawer.add_point(&Coordinate::new(50.0, 4.0));
        // ~715 m of straight line in 30 m steps
        drawer.add_point(&Coordinate::new(50.0, 4.01));
        let before = drawer.points().len();

        let removed = drawer.undo();
        assert!(removed > 1 && removed < before);
        assert_eq!(drawer.points().len(), before - removed);

        let end = Coordinate::new(50.0, 4.01);
        let new_end = *drawer.points().last().unwrap();
        assert!(new_end.distance_to(&end) > UNDO_DISTANCE_M);
        assert!(new_end.distance_to(&end) < UNDO_DISTANCE_M + DENSIFY_SPACING_M + 1.0);
    }

    #[test]
    fn test_undo_single_and_pair() {
        let mut drawer = RouteDrawer::new();
        assert_eq!(drawer.undo(), 0);

        drawer.add_point(&Coordinate::new(50.0, 4.0));
        assert_eq!(drawer.undo(), 1);
        assert!(!drawer.has_route());

        drawer.add_point(&Coordinate::new(50.0, 4.0));
        drawer.add_point(&Coordinate::new(50.0, 4.0001));
        assert_eq!(drawer.undo(), 1);
        assert_eq!(drawer.points(), &[Coordinate::new(50.0, 4.0)]);
    }

    #[test]
    fn test_undo_is_capped() {
        let mut drawer = RouteDrawer::new();
        drawer.add_point(&Coordinate::new(50.0, 4.0));
        // Repeated taps on one spot, all within range of the end
        for _ in 0..150 {
            drawer.add_point(&Coordinate::new(50.0, 4.0));
        }
        assert_eq!(drawer.points().len(), 151);
        assert_eq!(drawer.undo(), UNDO_MAX_POINTS);
        assert_eq!(drawer.points().len(), 51);
    }

    #[test]
    fn test_clear() {
        let mut drawer = drawer_with_road(3);
        drawer.add_point(&Coordinate::new(50.0, 4.0));
        drawer.clear();
        assert!(drawer.points().is_empty());
    }
}
