//! Scored roads.

use crate::ScoreClass;
use grvlfinder_geo::{path_length_meters, Coordinate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenStreetMap tags of a way.
pub type Tags = BTreeMap<String, String>;

const GRAVEL_MARKERS: [&str; 6] = ["gravel", "dirt", "ground", "earth", "unpaved", "compacted"];
const PAVED_MARKERS: [&str; 3] = ["asphalt", "paved", "concrete"];

/// A way with its geometry, tags and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    /// Way geometry
    pub points: Vec<Coordinate>,
    /// OSM tags
    pub tags: Tags,
    /// Suitability score for the active profile
    pub score: i32,
    /// Steepest sampled slope, when elevation data was fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slope_percent: Option<f64>,
}

impl Road {
    /// Unscored road.
    #[must_use]
    pub fn new(points: Vec<Coordinate>, tags: Tags) -> Self {
        Self {
            points,
            tags,
            score: 0,
            max_slope_percent: None,
        }
    }

    /// Value of a tag.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// `surface` tag.
    #[must_use]
    pub fn surface(&self) -> Option<&str> {
        self.tag("surface")
    }

    /// Length of the geometry in meters.
    #[must_use]
    pub fn length_m(&self) -> f64 {
        path_length_meters(&self.points)
    }

    /// Unpaved surface (gravel, dirt, ground, earth, unpaved, compacted).
    ///
    /// "unpaved" contains "paved", so check this before [`Road::is_paved_surface`].
    #[must_use]
    pub fn is_gravel_surface(&self) -> bool {
        surface_contains(self.surface(), &GRAVEL_MARKERS)
    }

    /// Paved surface (asphalt, paved, concrete).
    #[must_use]
    pub fn is_paved_surface(&self) -> bool {
        surface_contains(self.surface(), &PAVED_MARKERS)
    }

    /// Score class of the current score.
    #[must_use]
    pub fn score_class(&self) -> ScoreClass {
        ScoreClass::from_score(self.score)
    }
}

fn surface_contains(surface: Option<&str>, markers: &[&str]) -> bool {
    surface.is_some_and(|s| {
        let s = s.to_lowercase();
        markers.iter().any(|m| s.contains(m))
    })
}
