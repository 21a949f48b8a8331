//! Error types for the routing crate.

use thiserror::Error;

/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while routing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoutingError {
    /// The search area contains no usable roads
    #[error("No roads found in area")]
    NoRoads,

    /// Start or end is too far from every road node
    #[error("Cannot connect start/end to road network")]
    CannotConnect,

    /// The search gave up or the endpoints are in disconnected parts of the network
    #[error("No route found")]
    NoRoute,
}

/// Error code for integration with grvlfinder-core error handling.
/// Range: 12xxx for routing errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingErrorCode {
    /// No roads in area
    NoRoads = 12001,
    /// Endpoint not near the network
    CannotConnect = 12002,
    /// No path
    NoRoute = 12003,
}

impl RoutingError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> RoutingErrorCode {
        match self {
            RoutingError::NoRoads => RoutingErrorCode::NoRoads,
            RoutingError::CannotConnect => RoutingErrorCode::CannotConnect,
            RoutingError::NoRoute => RoutingErrorCode::NoRoute,
        }
    }
}
