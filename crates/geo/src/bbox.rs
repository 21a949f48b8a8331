//! Axis-aligned bounding boxes in degrees.

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A latitude/longitude box, stored in Overpass order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude
    pub south: f64,
    /// Western longitude
    pub west: f64,
    /// Northern latitude
    pub north: f64,
    /// Eastern longitude
    pub east: f64,
}

impl BoundingBox {
    /// Creates a box, rejecting inverted or out-of-range edges.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self> {
        let bbox = Self {
            south,
            west,
            north,
            east,
        };

        let corners_valid = Coordinate::new(south, west).is_valid()
            && Coordinate::new(north, east).is_valid();
        if !corners_valid || south > north || west > east {
            return Err(GeoError::InvalidBoundingBox(bbox.to_overpass()));
        }

        Ok(bbox)
    }

    /// Smallest box containing every point, `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            south: first.latitude,
            west: first.longitude,
            north: first.latitude,
            east: first.longitude,
        };

        Some(points.iter().skip(1).fold(init, |acc, p| Self {
            south: acc.south.min(p.latitude),
            west: acc.west.min(p.longitude),
            north: acc.north.max(p.latitude),
            east: acc.east.max(p.longitude),
        }))
    }

    /// Box extending `radius_m` meters from `center` in every direction.
    #[must_use]
    pub fn around(center: &Coordinate, radius_m: f64) -> Self {
        let lat_delta = radius_m / METERS_PER_DEGREE;
        let lon_scale = center.latitude.to_radians().cos().abs().max(1e-6);
        let lon_delta = radius_m / (METERS_PER_DEGREE * lon_scale);

        Self {
            south: (center.latitude - lat_delta).max(-90.0),
            west: (center.longitude - lon_delta).max(-180.0),
            north: (center.latitude + lat_delta).min(90.0),
            east: (center.longitude + lon_delta).min(180.0),
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Box grown by `buffer_deg` degrees on every side.
    #[must_use]
    pub fn expanded(&self, buffer_deg: f64) -> Self {
        Self {
            south: self.south - buffer_deg,
            west: self.west - buffer_deg,
            north: self.north + buffer_deg,
            east: self.east + buffer_deg,
        }
    }

    /// Box grown on each side by `fraction` of its own height and width.
    #[must_use]
    pub fn expanded_by_fraction(&self, fraction: f64) -> Self {
        let lat_margin = (self.north - self.south) * fraction;
        let lon_margin = (self.east - self.west) * fraction;

        Self {
            south: self.south - lat_margin,
            west: self.west - lon_margin,
            north: self.north + lat_margin,
            east: self.east + lon_margin,
        }
    }

    /// True when the boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.north < other.south
            || other.north < self.south
            || self.east < other.west
            || other.east < self.west)
    }

    /// True when `point` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }

    /// `"south,west,north,east"` as used inside Overpass QL filters.
    #[must_use]
    pub fn to_overpass(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.south, self.west, self.north, self.east
        )
    }

    /// Stable key for caching per-area responses.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{:.6}_{:.6}_{:.6}_{:.6}",
            self.south, self.west, self.north, self.east
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_overpass())
    }
}

impl FromStr for BoundingBox {
    type Err = GeoError;

    /// Parses `"south,west,north,east"`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| GeoError::InvalidBoundingBox(format!("not numeric: \"{s}\"")))?;

        match values.as_slice() {
            &[south, west, north, east] => Self::new(south, west, north, east),
            _ => Err(GeoError::InvalidBoundingBox(format!(
                "expected \"south,west,north,east\", got \"{s}\""
            ))),
        }
    }
}
