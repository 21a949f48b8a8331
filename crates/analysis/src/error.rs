//! Error types for the analysis crate.

use grvlfinder_api_client::ApiError;
use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while finding roads or evaluating a route.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The route has no points
    #[error("No route points provided")]
    NoRoutePoints,

    /// A map service call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response cache failed
    #[error("Cache error: {0}")]
    Cache(#[from] grvlfinder_core::Error),
}

/// Error code for integration with grvlfinder-core error handling.
/// Range: 14xxx for analysis errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorCode {
    /// The route has no points
    NoRoutePoints = 14001,
    /// A map service call failed
    Api = 14002,
    /// The response cache failed
    Cache = 14003,
}

impl AnalysisError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> AnalysisErrorCode {
        match self {
            AnalysisError::NoRoutePoints => AnalysisErrorCode::NoRoutePoints,
            AnalysisError::Api(_) => AnalysisErrorCode::Api,
            AnalysisError::Cache(_) => AnalysisErrorCode::Cache,
        }
    }

    /// Short message suitable for showing to a rider.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Api(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}
