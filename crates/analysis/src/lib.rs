//! Road finding and route evaluation for grvlfinder.
//!
//! - **Road finding**: Overpass ways scored for the rider's profile, with optional
//!   measured slopes and weather
//! - **Slopes**: batched elevation sampling with outlier rejection
//! - **Route evaluation**: share of a GPX route on green, yellow and red roads, plus the
//!   steepest section
//!
//! Map services sit behind the [`RoadProvider`] and [`ElevationProvider`] traits so the
//! evaluation logic runs against stubs in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use grvlfinder_analysis::{RoadFinder, RouteEvaluator};
//! use grvlfinder_api_client::GrvlClient;
//! use grvlfinder_scoring::BikeProfile;
//!
//! # async fn run(points: Vec<grvlfinder_geo::Coordinate>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = GrvlClient::new()?;
//! let profile = BikeProfile::default();
//! let elevation = client.elevation();
//!
//! let evaluator = RouteEvaluator::new(RoadFinder::new(&client, profile.clone()));
//! let analysis = evaluator
//!     .evaluate(&points, &profile, Some(&elevation), |p| println!("{p}%"))
//!     .await?;
//! println!("{}", analysis.quality_assessment());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod evaluator;
mod finder;
mod provider;
mod report;
pub mod slope;

pub use error::{AnalysisError, AnalysisErrorCode, Result};
pub use evaluator::{build_segments, EvaluatorConfig, RouteEvaluator, RouteSegment};
pub use finder::RoadFinder;
pub use provider::{ElevationProvider, RoadProvider};
pub use report::{RouteAnalysis, DECENT_ROADS, EXCELLENT_ROADS, NO_ROAD_DATA, POOR_ROADS};
pub use slope::{enrich_roads_with_slope, enrich_route_elevation, max_slope_percent};
