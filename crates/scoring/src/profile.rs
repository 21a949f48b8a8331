//! The rider's profile: bike type, custom weights and data toggles.

use crate::{BikeType, Criterion, Result, Weights};
use grvlfinder_core::config::ProfileConfig;
use serde::{Deserialize, Serialize};

/// Active bike type plus the custom-mode weights and feature toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikeProfile {
    bike_type: BikeType,
    custom_weights: Weights,
    elevation_data_enabled: bool,
    weather_enabled: bool,
}

impl Default for BikeProfile {
    fn default() -> Self {
        Self {
            bike_type: BikeType::Gravel,
            custom_weights: Weights::for_bike_type(BikeType::Custom),
            elevation_data_enabled: false,
            weather_enabled: true,
        }
    }
}

impl BikeProfile {
    /// Default profile with the given bike type.
    #[must_use]
    pub fn new(bike_type: BikeType) -> Self {
        Self {
            bike_type,
            ..Self::default()
        }
    }

    /// Reads the `[profile]` section.
    ///
    /// # Errors
    ///
    /// Fails on an unknown bike type or criterion name.
    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        let mut custom_weights = Weights::for_bike_type(BikeType::Custom);
        for (key, value) in &config.custom_weights {
            custom_weights.set(key.parse::<Criterion>()?, *value);
        }

        Ok(Self {
            bike_type: config.bike_type.parse()?,
            custom_weights,
            elevation_data_enabled: config.elevation_data_enabled,
            weather_enabled: config.weather_enabled,
        })
    }

    /// Writes this profile into a `[profile]` section.
    pub fn to_config(&self, config: &mut ProfileConfig) {
        config.bike_type = self.bike_type.as_str().to_string();
        config.custom_weights = self.custom_weights.to_map();
        config.elevation_data_enabled = self.elevation_data_enabled;
        config.weather_enabled = self.weather_enabled;
    }

    /// Selected bike type.
    #[must_use]
    pub fn bike_type(&self) -> BikeType {
        self.bike_type
    }

    /// Switch bike type.
    pub fn set_bike_type(&mut self, bike_type: BikeType) {
        self.bike_type = bike_type;
    }

    /// Weights used by the custom mode.
    #[must_use]
    pub fn custom_weights(&self) -> &Weights {
        &self.custom_weights
    }

    /// Change one custom-mode weight.
    pub fn set_custom_weight(&mut self, criterion: Criterion, value: i32) {
        self.custom_weights.set(criterion, value);
    }

    /// Weights for the selected bike type.
    #[must_use]
    pub fn current_weights(&self) -> Weights {
        match self.bike_type {
            BikeType::Custom => self.custom_weights,
            other => Weights::for_bike_type(other),
        }
    }

    /// Elevation toggle as set by the user.
    #[must_use]
    pub fn elevation_data_enabled(&self) -> bool {
        self.elevation_data_enabled
    }

    /// Set the elevation toggle.
    pub fn set_elevation_data_enabled(&mut self, enabled: bool) {
        self.elevation_data_enabled = enabled;
    }

    /// Weather toggle.
    #[must_use]
    pub fn weather_enabled(&self) -> bool {
        self.weather_enabled
    }

    /// Set the weather toggle.
    pub fn set_weather_enabled(&mut self, enabled: bool) {
        self.weather_enabled = enabled;
    }

    /// Whether steep roads are penalised.
    #[must_use]
    pub fn should_penalize_slopes(&self) -> bool {
        match self.bike_type {
            BikeType::RaceBikepacking | BikeType::GravelBikepacking => true,
            BikeType::Custom => self.custom_weights.slope > 0,
            BikeType::RaceRoad | BikeType::Gravel => false,
        }
    }

    /// Whether elevation has to be looked up for this profile.
    #[must_use]
    pub fn should_fetch_elevation_data(&self) -> bool {
        match self.bike_type {
            BikeType::RaceBikepacking | BikeType::GravelBikepacking => true,
            BikeType::RaceRoad | BikeType::Gravel => self.elevation_data_enabled,
            BikeType::Custom => self.elevation_data_enabled && self.custom_weights.slope > 0,
        }
    }

    /// Race types favour asphalt.
    #[must_use]
    pub fn prefers_paved_roads(&self) -> bool {
        matches!(self.bike_type, BikeType::RaceRoad | BikeType::RaceBikepacking)
    }
}
