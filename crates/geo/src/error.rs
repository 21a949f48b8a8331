//! Rejected coordinates and bounding boxes

use thiserror::Error;

/// Result with [`GeoError`]
pub type Result<T> = std::result::Result<T, GeoError>;

/// Input that does not describe a place on earth
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude or longitude out of range, or text that is not `lat,lon`
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Corner out of range, south above north or west above east
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// Numeric codes in the 10xxx range
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// See [`GeoError::InvalidCoordinate`]
    InvalidCoordinate = 10001,
    /// See [`GeoError::InvalidBoundingBox`]
    InvalidBoundingBox = 10002,
}

impl GeoError {
    /// Code of this error
    #[must_use]
    pub fn code(&self) -> GeoErrorCode {
        match self {
            Self::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            Self::InvalidBoundingBox(_) => GeoErrorCode::InvalidBoundingBox,
        }
    }
}
