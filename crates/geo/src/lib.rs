//! Geospatial primitives for grvlfinder.
//!
//! This crate provides:
//! - Haversine distance calculations and path lengths
//! - Bounding boxes in Overpass order (south, west, north, east)
//! - Point-to-segment projection for road matching
//! - Track sampling for elevation lookups
//! - Batch nearest-point queries with optional parallelism
//!
//! # Example
//!
//! ```
//! use grvlfinder_geo::{haversine_distance, Coordinate};
//!
//! let leuven = Coordinate::new(50.8798, 4.7005);
//! let brussels = Coordinate::new(50.8503, 4.3517);
//!
//! let distance_km = haversine_distance(&leuven, &brussels);
//! assert!((distance_km - 24.7).abs() < 1.0);
//! ```

#![warn(missing_docs)]

mod bbox;
mod error;
mod haversine;
mod segment;

pub mod batch;
pub mod sampling;

use std::fmt;
use std::str::FromStr;

pub use batch::{distances_from, nearest_within, DistanceResult};
pub use bbox::BoundingBox;
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_meters, path_length_meters,
    EARTH_RADIUS_KM, EARTH_RADIUS_M,
};
pub use sampling::{
    densify_line, elevation_sample_count, resample_by_spacing, sample_along, SamplePoint,
};
pub use segment::{closest_point_on_segment, interpolate, point_to_segment_distance};

/// A geographic coordinate with latitude, longitude and an optional elevation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Elevation in meters, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Coordinate {
    /// Creates a new coordinate without elevation.
    #[inline]
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
        }
    }

    /// Returns a copy carrying the given elevation.
    #[inline]
    #[must_use]
    pub const fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }

    /// Great-circle distance to `other` in meters.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance_meters(self, other)
    }

    /// Stable key used to merge road-network nodes that share a position.
    #[must_use]
    pub fn node_key(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }

    /// Arithmetic midpoint of latitude and longitude.
    ///
    /// Elevation is averaged only when both ends carry one.
    #[must_use]
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
            elevation: self
                .elevation
                .zip(other.elevation)
                .map(|(a, b)| (a + b) / 2.0),
        }
    }

    /// True when the elevation is present and not the 0.0 placeholder some GPX writers emit.
    #[inline]
    #[must_use]
    pub fn has_elevation(&self) -> bool {
        self.elevation.is_some_and(|e| e != 0.0)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = GeoError;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(str::trim);
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GeoError::InvalidCoordinate(format!(
                "expected \"lat,lon\", got \"{s}\""
            )));
        };

        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| GeoError::InvalidCoordinate(format!("not a number: \"{v}\"")))
        };
        let coord = Coordinate::new(parse(lat)?, parse(lon)?);

        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!("out of range: {coord}")))
        }
    }
}
