//! Tag-based road scoring.

use crate::{WeatherCondition, Weights};
use grvlfinder_geo::{path_length_meters, Coordinate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, trace};

static NON_WIDTH_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("valid regex"));
static NON_INCLINE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("valid regex"));

/// Penalty for a slope percentage at the given slope weight.
///
/// The sign of the slope is ignored.
#[must_use]
pub fn slope_penalty(percent: f64, weight: i32) -> i32 {
    let slope = percent.abs();
    if slope >= 20.0 {
        -weight * 1000
    } else if slope >= 15.0 {
        -weight * 500
    } else if slope >= 12.0 {
        -weight * 250
    } else {
        0
    }
}

/// Scores roads from their OSM tags for one set of weights.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: Weights,
    weather: Option<WeatherCondition>,
    weather_enabled: bool,
}

impl ScoreCalculator {
    /// Calculator without weather data.
    #[must_use]
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            weather: None,
            weather_enabled: true,
        }
    }

    /// Attach recent weather.
    #[must_use]
    pub fn with_weather(mut self, condition: WeatherCondition) -> Self {
        debug!(
            rainy_days = condition.rainy_days,
            muddy = condition.is_muddy,
            "Weather condition set"
        );
        self.weather = Some(condition);
        self
    }

    /// Turn weather adjustment on or off.
    pub fn set_weather_enabled(&mut self, enabled: bool) {
        self.weather_enabled = enabled;
    }

    /// Replace the weights.
    pub fn set_weights(&mut self, weights: Weights) {
        self.weights = weights;
    }

    /// Current weights.
    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Attached weather, if any.
    #[must_use]
    pub fn weather(&self) -> Option<&WeatherCondition> {
        self.weather.as_ref()
    }

    /// Score from tags and geometry, never negative.
    #[must_use]
    pub fn score(&self, tags: &BTreeMap<String, String>, points: &[Coordinate]) -> i32 {
        let base = self.base_score(tags, points);
        self.apply_weather(base.max(0), tags)
    }

    /// Like [`ScoreCalculator::score`] but with a measured slope replacing the `incline` tag.
    ///
    /// `None` or a negative slope means no data and no slope penalty.
    #[must_use]
    pub fn score_with_slope(
        &self,
        tags: &BTreeMap<String, String>,
        points: &[Coordinate],
        max_slope_percent: Option<f64>,
    ) -> i32 {
        let w = self.weights.slope;
        let measured = match max_slope_percent {
            Some(slope) if slope >= 0.0 => slope_penalty(slope, w),
            _ => 0,
        };
        let score = self.base_score(tags, points) - incline_score(tag(tags, "incline"), w) + measured;
        self.apply_weather(score.max(0), tags)
    }

    /// Mud warning for a road, when weather is enabled and muddy.
    #[must_use]
    pub fn weather_warning(&self, tags: &BTreeMap<String, String>) -> Option<String> {
        if !self.weather_enabled {
            return None;
        }
        self.weather.as_ref()?.road_warning(tag(tags, "surface"))
    }

    /// Text summary of the weather in use.
    #[must_use]
    pub fn weather_summary(&self) -> String {
        match &self.weather {
            None => "No weather data available".to_string(),
            Some(_) if !self.weather_enabled => "Weather analysis disabled".to_string(),
            Some(condition) => condition.detailed_report(),
        }
    }

    fn apply_weather(&self, score: i32, tags: &BTreeMap<String, String>) -> i32 {
        let Some(condition) = self.weather.as_ref().filter(|_| self.weather_enabled) else {
            return score;
        };
        let penalty = condition.mud_penalty(tag(tags, "surface"));
        if penalty < 0 {
            trace!(penalty, rainy_days = condition.rainy_days, "Weather penalty");
        }
        (score + penalty).max(0)
    }

    fn base_score(&self, tags: &BTreeMap<String, String>, points: &[Coordinate]) -> i32 {
        let w = &self.weights;
        surface_score(tag(tags, "surface"), w.surface)
            + smoothness_score(tag(tags, "smoothness"), w.smoothness)
            + tracktype_score(tag(tags, "tracktype"), w.tracktype)
            + bicycle_score(tag(tags, "bicycle"), w.bicycle)
            + width_score(tag(tags, "width"), w.width)
            + length_score(points, w.length)
            + incline_score(tag(tags, "incline"), w.slope)
    }
}

fn tag<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

fn surface_score(surface: Option<&str>, w: i32) -> i32 {
    match surface.map(str::to_lowercase).as_deref() {
        Some("gravel" | "fine_gravel" | "pebblestone" | "compacted") => 2 * w,
        Some("ground" | "earth" | "dirt" | "unpaved") => w,
        Some("asphalt" | "paved" | "concrete" | "concrete:plates") => -4 * w,
        _ => 0,
    }
}

fn smoothness_score(smoothness: Option<&str>, w: i32) -> i32 {
    match smoothness.map(str::to_lowercase).as_deref() {
        Some("good") => w,
        Some("bad") => -w,
        _ => 0,
    }
}

fn tracktype_score(tracktype: Option<&str>, w: i32) -> i32 {
    match tracktype.map(str::to_lowercase).as_deref() {
        Some("grade2" | "grade3") => w,
        Some("grade1") => -w,
        _ => 0,
    }
}

fn bicycle_score(bicycle: Option<&str>, w: i32) -> i32 {
    match bicycle.map(str::to_lowercase).as_deref() {
        Some("yes" | "designated") => w,
        Some("no") => -2 * w,
        _ => 0,
    }
}

fn width_score(width: Option<&str>, w: i32) -> i32 {
    let Some(width) = width else { return 0 };
    match NON_WIDTH_CHARS.replace_all(width, "").parse::<f64>() {
        Ok(m) if m >= 3.0 => w,
        Ok(m) if m < 1.5 => -w,
        _ => 0,
    }
}

fn length_score(points: &[Coordinate], w: i32) -> i32 {
    if points.len() < 2 {
        return 0;
    }
    let length = path_length_meters(points);
    if length >= 300.0 {
        w
    } else if length < 50.0 {
        -w
    } else {
        0
    }
}

fn incline_score(incline: Option<&str>, w: i32) -> i32 {
    if w == 0 {
        return 0;
    }
    let Some(incline) = incline else { return 0 };
    let lower = incline.to_lowercase();
    let cleaned = NON_INCLINE_CHARS.replace_all(&lower, "");
    if cleaned.is_empty() {
        return match lower.as_str() {
            "steep" => -w * 200,
            "up" | "down" => -w * 50,
            _ => 0,
        };
    }
    match cleaned.parse::<f64>() {
        Ok(percent) => slope_penalty(percent, w),
        Err(_) => {
            debug!(incline = %incline, "Could not parse incline");
            0
        }
    }
}
