//! Error types for the gpx crate.

use thiserror::Error;

/// Result type alias for GPX operations.
pub type Result<T> = std::result::Result<T, GpxError>;

/// Errors raised while reading or writing GPX.
#[derive(Debug, Error)]
pub enum GpxError {
    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// lat/lon attribute missing or not a valid coordinate
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// Document parsed but held no trkpt, rtept or wpt
    #[error("No track points found")]
    NoPoints,

    /// Nothing to write
    #[error("No route to export")]
    EmptyRoute,

    /// File system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::events::attributes::AttrError> for GpxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        GpxError::Xml(err.into())
    }
}

/// Error code for integration with grvlfinder-core error handling.
/// Range: 11xxx for GPX errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpxErrorCode {
    /// Malformed XML
    Xml = 11001,
    /// Bad point attributes
    InvalidPoint = 11002,
    /// No points in document
    NoPoints = 11003,
    /// Nothing to export
    EmptyRoute = 11004,
    /// File system failure
    Io = 11005,
}

impl GpxError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> GpxErrorCode {
        match self {
            GpxError::Xml(_) => GpxErrorCode::Xml,
            GpxError::InvalidPoint(_) => GpxErrorCode::InvalidPoint,
            GpxError::NoPoints => GpxErrorCode::NoPoints,
            GpxError::EmptyRoute => GpxErrorCode::EmptyRoute,
            GpxError::Io(_) => GpxErrorCode::Io,
        }
    }
}
