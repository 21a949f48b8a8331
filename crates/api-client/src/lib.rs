//! HTTP access to the public map services
//!
//! One [`GrvlClient`] talks to Overpass (roads), OpenTopoData (elevation),
//! Open-Meteo (rainfall) and OSRM (fallback routing). Endpoints come from the
//! `[services]` table or `GRVLFINDER_*` environment variables. Busy services are
//! retried with backoff, a run of failures opens a circuit breaker, and each host is
//! throttled to its fair-use limit, with elevation lookups held to one per second.
//!
//! ```rust,no_run
//! use grvlfinder_api_client::GrvlClient;
//! use grvlfinder_geo::BoundingBox;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GrvlClient::new()?;
//! let bbox = BoundingBox::new(50.87, 4.69, 50.89, 4.71)?;
//!
//! let ways = client.overpass().fetch_ways(&bbox).await?;
//! let weather = client.weather().recent_conditions_for_area(&bbox).await?;
//! println!("{} ways. {}", ways.len(), weather.warning_message());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::GrvlClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
