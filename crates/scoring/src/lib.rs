//! Road scoring for grvlfinder.
//!
//! Scores OpenStreetMap ways for a chosen bike type from their tags, their length,
//! an optional measured slope and recent rainfall.
//!
//! - **Bike types**: presets for race, gravel and bikepacking riding plus a custom mode
//! - **Weights**: per-criterion weights, persisted for the custom mode
//! - **Scoring**: tag based score with slope penalties and a mud adjustment
//! - **Filtering**: green/yellow/red score classes
//!
//! # Example
//!
//! ```
//! use grvlfinder_scoring::{BikeType, ScoreCalculator, ScoreClass, Tags, Weights};
//! use grvlfinder_geo::Coordinate;
//!
//! let calculator = ScoreCalculator::new(Weights::for_bike_type(BikeType::Gravel));
//!
//! let mut tags = Tags::new();
//! tags.insert("surface".into(), "gravel".into());
//! tags.insert("tracktype".into(), "grade2".into());
//!
//! let points = [Coordinate::new(50.0, 4.0), Coordinate::new(50.0, 4.005)];
//! let score = calculator.score(&tags, &points);
//!
//! assert_eq!(score, 40);
//! assert_eq!(ScoreClass::from_score(score), ScoreClass::Green);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bike;
mod error;
mod filter;
mod profile;
mod road;
mod score;
mod weather;
mod weights;

pub use bike::BikeType;
pub use error::{Result, ScoringError, ScoringErrorCode};
pub use filter::{ScoreClass, ScoreFilter};
pub use profile::BikeProfile;
pub use road::{Road, Tags};
pub use score::{slope_penalty, ScoreCalculator};
pub use weather::{WeatherCondition, DAYS_TO_CHECK, MIN_RAINY_DAYS, RAIN_THRESHOLD_MM};
pub use weights::{Criterion, Weights};
