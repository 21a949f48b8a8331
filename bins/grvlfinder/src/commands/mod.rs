//! Command implementations

pub mod analyze;
pub mod cache;
pub mod config;
pub mod draw;
pub mod export;
pub mod find;
pub mod profile;
pub mod route;
pub mod weather;

use anyhow::Result;
use clap::Args;
use grvlfinder_geo::{BoundingBox, Coordinate};
use grvlfinder_scoring::ScoreClass;
use std::path::{Path, PathBuf};

/// Area selection shared by `find` and `weather`
#[derive(Debug, Clone, Args)]
pub struct AreaArgs {
    /// Bounding box as south,west,north,east
    #[arg(long, allow_hyphen_values = true, conflicts_with = "center")]
    pub bbox: Option<BoundingBox>,

    /// Center point as lat,lon
    #[arg(long, allow_hyphen_values = true)]
    pub center: Option<Coordinate>,

    /// Radius around --center in meters
    #[arg(long, default_value_t = 1_000.0)]
    pub radius_m: f64,
}

impl AreaArgs {
    pub fn resolve(&self) -> Result<BoundingBox> {
        match (self.bbox, self.center) {
            (Some(bbox), _) => Ok(bbox),
            (None, Some(center)) => Ok(BoundingBox::around(&center, self.radius_m)),
            (None, None) => Err(grvlfinder_core::Error::validation("Specify an area with --bbox or --center")
                .with_suggestion("For example: --center 50.88,4.70 --radius-m 2000")
                .into()),
        }
    }
}

/// Parse `green`, `yellow` or `red`
pub fn parse_score_class(s: &str) -> std::result::Result<ScoreClass, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" => Ok(ScoreClass::Green),
        "yellow" => Ok(ScoreClass::Yellow),
        "red" => Ok(ScoreClass::Red),
        other => Err(format!("unknown score class '{other}' (expected green, yellow or red)")),
    }
}

/// Split an output path into the directory and file name `export_to_file` expects
pub fn split_output(path: &Path) -> (PathBuf, Option<String>) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    (dir, name)
}

/// `--weather` / `--no-weather` as an override of the saved profile setting
pub fn weather_override(weather: bool, no_weather: bool) -> Option<bool> {
    match (weather, no_weather) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
