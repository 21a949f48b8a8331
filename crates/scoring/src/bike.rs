//! Bike types.

use crate::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Riding style the scores are tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BikeType {
    /// Fast rides on paved roads
    RaceRoad,
    /// Gravel riding (the default)
    #[default]
    Gravel,
    /// Loaded touring on paved roads
    RaceBikepacking,
    /// Loaded touring on gravel
    GravelBikepacking,
    /// User-defined weights
    Custom,
}

impl BikeType {
    /// Every bike type, in menu order.
    pub const ALL: [BikeType; 5] = [
        BikeType::RaceRoad,
        BikeType::Gravel,
        BikeType::RaceBikepacking,
        BikeType::GravelBikepacking,
        BikeType::Custom,
    ];

    /// Kebab-case identifier, as stored in the config file.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeType::RaceRoad => "race-road",
            BikeType::Gravel => "gravel",
            BikeType::RaceBikepacking => "race-bikepacking",
            BikeType::GravelBikepacking => "gravel-bikepacking",
            BikeType::Custom => "custom",
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            BikeType::RaceRoad => "Race Bike - Roads",
            BikeType::Gravel => "Gravel Bike - Gravel",
            BikeType::RaceBikepacking => "Bikepacking - Race Bike",
            BikeType::GravelBikepacking => "Bikepacking - Gravel",
            BikeType::Custom => "Custom Mode",
        }
    }

    /// Menu emoji.
    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            BikeType::RaceRoad => "🚴‍♂️",
            BikeType::Gravel => "🚵‍♂️",
            BikeType::RaceBikepacking => "🎒🚴‍♂️",
            BikeType::GravelBikepacking => "🎒🚵‍♂️",
            BikeType::Custom => "⚙️",
        }
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            BikeType::RaceRoad => "Fast rides on asphalt and paved roads",
            BikeType::Gravel => "Adventure rides on gravel and unpaved roads",
            BikeType::RaceBikepacking => "Long distance touring on paved roads",
            BikeType::GravelBikepacking => "Long distance touring on gravel roads",
            BikeType::Custom => "Configure your own criteria",
        }
    }

    /// Emoji followed by the display name.
    #[must_use]
    pub fn full_display_name(&self) -> String {
        format!("{} {}", self.emoji(), self.display_name())
    }

    /// True for the two bikepacking types.
    #[must_use]
    pub fn is_bikepacking(&self) -> bool {
        matches!(self, BikeType::RaceBikepacking | BikeType::GravelBikepacking)
    }
}

impl fmt::Display for BikeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BikeType {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        BikeType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ScoringError::UnknownBikeType(s.to_string()))
    }
}
