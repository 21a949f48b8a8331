//! Scoring criteria and their weights.

use crate::{BikeType, Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A scored aspect of a road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Criterion {
    Surface,
    Smoothness,
    Tracktype,
    Bicycle,
    Width,
    Length,
    Slope,
}

impl Criterion {
    /// All criteria in display order.
    pub const ALL: [Criterion; 7] = [
        Criterion::Surface,
        Criterion::Smoothness,
        Criterion::Tracktype,
        Criterion::Bicycle,
        Criterion::Width,
        Criterion::Length,
        Criterion::Slope,
    ];

    /// Key used in weight maps and config files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Surface => "surface",
            Criterion::Smoothness => "smoothness",
            Criterion::Tracktype => "tracktype",
            Criterion::Bicycle => "bicycle",
            Criterion::Width => "width",
            Criterion::Length => "length",
            Criterion::Slope => "slope",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Criterion::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| ScoringError::UnknownCriterion(s.to_string()))
    }
}

/// Weight per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Weights {
    pub surface: i32,
    pub smoothness: i32,
    pub tracktype: i32,
    pub bicycle: i32,
    pub width: i32,
    pub length: i32,
    pub slope: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self::for_bike_type(BikeType::Gravel)
    }
}

impl Weights {
    /// Values used for criteria missing from a weight map.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            surface: 3,
            smoothness: 2,
            tracktype: 2,
            bicycle: 2,
            width: 1,
            length: 1,
            slope: 5,
        }
    }

    /// Preset for a bike type. `Custom` gets the initial custom-mode weights.
    #[must_use]
    pub const fn for_bike_type(bike_type: BikeType) -> Self {
        match bike_type {
            BikeType::RaceRoad => Self {
                surface: 30,
                smoothness: 10,
                tracktype: -50,
                bicycle: 10,
                width: 5,
                length: 8,
                slope: 0,
            },
            BikeType::Gravel => Self {
                surface: 10,
                smoothness: 5,
                tracktype: 10,
                bicycle: 0,
                width: 10,
                length: 10,
                slope: 0,
            },
            BikeType::RaceBikepacking => Self {
                surface: 30,
                smoothness: 12,
                tracktype: -50,
                bicycle: 10,
                width: 6,
                length: 5,
                slope: 10,
            },
            BikeType::GravelBikepacking | BikeType::Custom => Self {
                surface: 10,
                smoothness: 5,
                tracktype: 10,
                bicycle: 0,
                width: 10,
                length: 10,
                slope: 10,
            },
        }
    }

    /// Weight of one criterion.
    #[must_use]
    pub fn get(&self, criterion: Criterion) -> i32 {
        match criterion {
            Criterion::Surface => self.surface,
            Criterion::Smoothness => self.smoothness,
            Criterion::Tracktype => self.tracktype,
            Criterion::Bicycle => self.bicycle,
            Criterion::Width => self.width,
            Criterion::Length => self.length,
            Criterion::Slope => self.slope,
        }
    }

    /// Change one criterion.
    pub fn set(&mut self, criterion: Criterion, value: i32) {
        let slot = match criterion {
            Criterion::Surface => &mut self.surface,
            Criterion::Smoothness => &mut self.smoothness,
            Criterion::Tracktype => &mut self.tracktype,
            Criterion::Bicycle => &mut self.bicycle,
            Criterion::Width => &mut self.width,
            Criterion::Length => &mut self.length,
            Criterion::Slope => &mut self.slope,
        };
        *slot = value;
    }

    /// Builds weights from a name→value map; missing criteria take [`Weights::fallback`].
    ///
    /// Unknown keys are logged and ignored.
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, i32>) -> Self {
        let mut weights = Self::fallback();
        for (key, value) in map {
            match key.parse::<Criterion>() {
                Ok(criterion) => weights.set(criterion, *value),
                Err(_) => warn!(key = %key, "Ignoring unknown weight"),
            }
        }
        weights
    }

    /// Name→value map covering every criterion.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, i32> {
        Criterion::ALL
            .into_iter()
            .map(|c| (c.as_str().to_string(), self.get(c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let race = Weights::for_bike_type(BikeType::RaceRoad);
        assert_eq!(race.tracktype, -50);
        assert_eq!(race.slope, 0);

        let packing = Weights::for_bike_type(BikeType::RaceBikepacking);
        assert_eq!(packing.smoothness, 12);
        assert_eq!(packing.slope, 10);

        assert_eq!(
            Weights::for_bike_type(BikeType::Custom),
            Weights::for_bike_type(BikeType::GravelBikepacking)
        );
    }

    #[test]
    fn test_from_map_fills_fallback() {
        let mut map = BTreeMap::new();
        map.insert("surface".to_string(), 25);
        map.insert("wheelie".to_string(), 99);

        let weights = Weights::from_map(&map);
        assert_eq!(weights.surface, 25);
        assert_eq!(weights.smoothness, 2);
        assert_eq!(weights.slope, 5);
    }

    #[test]
    fn test_map_round_trip() {
        let weights = Weights::for_bike_type(BikeType::RaceRoad);
        let map = weights.to_map();
        assert_eq!(map.len(), 7);
        assert_eq!(map["tracktype"], -50);
        assert_eq!(Weights::from_map(&map), weights);
    }

    #[test]
    fn test_set_and_get() {
        let mut weights = Weights::fallback();
        weights.set(Criterion::Width, 7);
        assert_eq!(weights.get(Criterion::Width), 7);
    }

    #[test]
    fn test_criterion_parse() {
        assert_eq!("Slope".parse::<Criterion>().unwrap(), Criterion::Slope);
        assert!("speed".parse::<Criterion>().is_err());
    }
}
