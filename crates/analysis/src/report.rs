//! Result of a route evaluation.

use grvlfinder_geo::Coordinate;
use grvlfinder_scoring::BikeType;
use serde::Serialize;
use std::collections::BTreeMap;

/// Breakdown key for green segments.
pub const EXCELLENT_ROADS: &str = "excellent_roads";
/// Breakdown key for yellow segments.
pub const DECENT_ROADS: &str = "decent_roads";
/// Breakdown key for red segments.
pub const POOR_ROADS: &str = "poor_roads";
/// Breakdown key for segments without a nearby road.
pub const NO_ROAD_DATA: &str = "no_road_data";

/// Road quality and elevation summary of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAnalysis {
    /// Route length in km
    pub total_distance_km: f64,
    /// km on green roads
    pub green_km: f64,
    /// km on yellow roads
    pub yellow_km: f64,
    /// km on red roads
    pub red_km: f64,
    /// km without road data
    pub unknown_km: f64,
    /// Share of the route on green roads
    pub green_percent: f64,
    /// Share of the route on yellow roads
    pub yellow_percent: f64,
    /// Share of the route on red roads
    pub red_percent: f64,
    /// Share of the route without road data
    pub unknown_percent: f64,
    /// Steepest segment slope
    pub max_slope_percent: f64,
    /// Start of the steepest segment
    pub steepest_point: Option<Coordinate>,
    /// `"lat, lon"` of the steepest segment, or "Unknown"
    pub steepest_location: String,
    /// Whether slopes could be computed
    pub has_elevation: bool,
    /// Profile the route was scored for
    pub bike_type: BikeType,
    /// Number of segments
    pub total_segments: usize,
    /// Segments matched to a road
    pub segments_with_road_data: usize,
    /// Matched share of segments
    pub coverage_percent: f64,
    /// km per class key and per lowercase surface
    pub surface_breakdown_km: BTreeMap<String, f64>,
}

impl RouteAnalysis {
    /// Empty analysis for a bike type.
    #[must_use]
    pub fn new(bike_type: BikeType) -> Self {
        Self {
            total_distance_km: 0.0,
            green_km: 0.0,
            yellow_km: 0.0,
            red_km: 0.0,
            unknown_km: 0.0,
            green_percent: 0.0,
            yellow_percent: 0.0,
            red_percent: 0.0,
            unknown_percent: 0.0,
            max_slope_percent: 0.0,
            steepest_point: None,
            steepest_location: "Unknown".to_string(),
            has_elevation: false,
            bike_type,
            total_segments: 0,
            segments_with_road_data: 0,
            coverage_percent: 0.0,
            surface_breakdown_km: BTreeMap::new(),
        }
    }

    pub(crate) fn add_breakdown(&mut self, key: &str, km: f64) {
        *self.surface_breakdown_km.entry(key.to_string()).or_insert(0.0) += km;
    }

    pub(crate) fn finish(&mut self, matched: usize) {
        self.segments_with_road_data = matched;
        self.coverage_percent = percent_of_count(matched, self.total_segments);

        if self.total_distance_km > 0.0 {
            self.green_percent = self.green_km / self.total_distance_km * 100.0;
            self.yellow_percent = self.yellow_km / self.total_distance_km * 100.0;
            self.red_percent = self.red_km / self.total_distance_km * 100.0;
            self.unknown_percent = self.unknown_km / self.total_distance_km * 100.0;
        }
    }

    /// One-line verdict on road quality.
    #[must_use]
    pub fn quality_assessment(&self) -> String {
        if self.coverage_percent < 30.0 {
            "Limited data available for assessment".to_string()
        } else if self.green_percent >= 60.0 {
            format!("Excellent route for {}", self.bike_type.display_name())
        } else if self.green_percent + self.yellow_percent >= 70.0 {
            format!("Good route for {}", self.bike_type.display_name())
        } else if self.red_percent >= 50.0 {
            "Challenging route - many poor quality segments".to_string()
        } else {
            "Mixed quality route".to_string()
        }
    }

    /// One-line verdict on climbing.
    #[must_use]
    pub fn elevation_assessment(&self) -> String {
        if !self.has_elevation || self.max_slope_percent < 0.0 {
            return "No elevation data available".to_string();
        }
        let max = self.max_slope_percent;
        if max >= 15.0 {
            format!("Very steep route (max {max:.1}%)")
        } else if max >= 12.0 {
            format!("Steep sections present (max {max:.1}%)")
        } else if max >= 8.0 {
            format!("Moderate hills (max {max:.1}%)")
        } else {
            format!("Mostly flat route (max {max:.1}%)")
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent_of_count(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
