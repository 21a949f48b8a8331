//! Error types for the scoring crate.

use thiserror::Error;

/// Result type alias for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors raised while interpreting profile settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Bike type name not recognised
    #[error("Unknown bike type: {0} (expected race-road, gravel, race-bikepacking, gravel-bikepacking or custom)")]
    UnknownBikeType(String),

    /// Criterion name not recognised
    #[error("Unknown criterion: {0} (expected surface, smoothness, tracktype, bicycle, width, length or slope)")]
    UnknownCriterion(String),
}

/// Error code for integration with grvlfinder-core error handling.
/// Range: 13xxx for scoring errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringErrorCode {
    /// Bike type name not recognised
    UnknownBikeType = 13001,
    /// Criterion name not recognised
    UnknownCriterion = 13002,
}

impl ScoringError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ScoringErrorCode {
        match self {
            ScoringError::UnknownBikeType(_) => ScoringErrorCode::UnknownBikeType,
            ScoringError::UnknownCriterion(_) => ScoringErrorCode::UnknownCriterion,
        }
    }
}
