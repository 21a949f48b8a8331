//! Configuration schema definitions
//!
//! Every section is optional in the TOML file; missing keys take the defaults below.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Rider profile (bike type, weights, toggles)
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Remote service endpoints
    #[serde(default)]
    pub services: ServicesConfig,

    /// Route analysis tuning
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Graph routing tuning
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheSettings,

    /// GPX export
    #[serde(default)]
    pub export: ExportConfig,
}

impl ConfigSchema {
    /// Reject values the routing and analysis code cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("analysis.segment_length_m", self.analysis.segment_length_m),
            ("analysis.match_distance_m", self.analysis.match_distance_m),
            ("routing.snap_distance_m", self.routing.snap_distance_m),
            ("routing.draw_snap_m", self.routing.draw_snap_m),
            ("routing.draw_node_m", self.routing.draw_node_m),
        ];
        if let Some((key, value)) = positive.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(Error::invalid_config_value(key, value));
        }
        let buffer = self.analysis.bbox_buffer_deg;
        if !buffer.is_finite() || buffer < 0.0 {
            return Err(Error::invalid_config_value("analysis.bbox_buffer_deg", buffer));
        }
        if self.routing.max_nodes == 0 {
            return Err(Error::invalid_config_value("routing.max_nodes", 0));
        }
        if self.routing.draw_max_iterations == 0 {
            return Err(Error::invalid_config_value("routing.draw_max_iterations", 0));
        }
        if self.services.timeout_secs == 0 {
            return Err(Error::invalid_config_value("services.timeout_secs", 0));
        }
        Ok(())
    }
}

/// Persisted rider profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    /// Selected bike type, kebab-case (`gravel`, `race-road`, ...)
    #[serde(default = "default_bike_type")]
    pub bike_type: String,

    /// Whether elevation data should be fetched for non-bikepacking profiles
    #[serde(default)]
    pub elevation_data_enabled: bool,

    /// Whether recent rainfall should adjust scores
    #[serde(default = "default_true")]
    pub weather_enabled: bool,

    /// Weights used by the custom bike type, keyed by criterion name
    #[serde(default)]
    pub custom_weights: BTreeMap<String, i32>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            bike_type: default_bike_type(),
            elevation_data_enabled: false,
            weather_enabled: true,
            custom_weights: BTreeMap::new(),
        }
    }
}

fn default_bike_type() -> String {
    "gravel".to_string()
}

fn default_true() -> bool {
    true
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServicesConfig {
    /// Overpass interpreter endpoint
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,

    /// OpenTopoData dataset endpoint
    #[serde(default = "default_elevation_url")]
    pub elevation_url: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// OSRM bicycle route endpoint
    #[serde(default = "default_osrm_url")]
    pub osrm_url: String,

    /// Optional OSRM API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osrm_api_key: Option<String>,

    /// User agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            elevation_url: default_elevation_url(),
            weather_url: default_weather_url(),
            osrm_url: default_osrm_url(),
            osrm_api_key: None,
            user_agent: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default Overpass endpoint
#[must_use]
pub fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

/// Default elevation endpoint
#[must_use]
pub fn default_elevation_url() -> String {
    "https://api.opentopodata.org/v1/srtm30m".to_string()
}

/// Default weather endpoint
#[must_use]
pub fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

/// Default OSRM endpoint
#[must_use]
pub fn default_osrm_url() -> String {
    "https://router.project-osrm.org/route/v1/bicycle/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Route analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Segment length in meters
    #[serde(default = "default_segment_length_m")]
    pub segment_length_m: f64,

    /// Buffer added around each segment when fetching roads, in degrees
    #[serde(default = "default_bbox_buffer_deg")]
    pub bbox_buffer_deg: f64,

    /// Maximum distance between a segment midpoint and a road, in meters
    #[serde(default = "default_match_distance_m")]
    pub match_distance_m: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segment_length_m: default_segment_length_m(),
            bbox_buffer_deg: default_bbox_buffer_deg(),
            match_distance_m: default_match_distance_m(),
        }
    }
}

fn default_segment_length_m() -> f64 {
    100.0
}

fn default_bbox_buffer_deg() -> f64 {
    0.02
}

fn default_match_distance_m() -> f64 {
    200.0
}

/// Graph routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Maximum nodes expanded by a smart route search
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Maximum distance from a route endpoint to the road network
    #[serde(default = "default_snap_distance_m")]
    pub snap_distance_m: f64,

    /// Snap radius for drawn points
    #[serde(default = "default_draw_snap_m")]
    pub draw_snap_m: f64,

    /// Nearest-node radius for drawn routes
    #[serde(default = "default_draw_node_m")]
    pub draw_node_m: f64,

    /// Search expansion cap for drawn routes
    #[serde(default = "default_draw_max_iterations")]
    pub draw_max_iterations: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            snap_distance_m: default_snap_distance_m(),
            draw_snap_m: default_draw_snap_m(),
            draw_node_m: default_draw_node_m(),
            draw_max_iterations: default_draw_max_iterations(),
        }
    }
}

fn default_max_nodes() -> usize {
    10_000
}

fn default_snap_distance_m() -> f64 {
    100.0
}

fn default_draw_snap_m() -> f64 {
    500.0
}

fn default_draw_node_m() -> f64 {
    150.0
}

fn default_draw_max_iterations() -> usize {
    5_000
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    /// Whether Overpass responses are cached
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Cache directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            dir: None,
        }
    }
}

fn default_ttl_secs() -> u64 {
    86_400
}

/// GPX export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Directory exported files land in (current directory when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// File name used when none is given
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            default_file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    "route.gpx".to_string()
}
