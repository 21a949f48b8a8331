//! Routing over scored OpenStreetMap roads.
//!
//! - **Road graph**: petgraph network with vertices merged by position and an A* search
//!   with an expansion cap
//! - **Smart routing**: point-to-point routes that prefer well-scored roads, with
//!   gravel/paved distances and the steepest climb
//! - **Route drawing**: tapped points snapped to roads and joined along the network
//!
//! # Example
//!
//! ```rust
//! use grvlfinder_geo::Coordinate;
//! use grvlfinder_routing::SmartRouter;
//! use grvlfinder_scoring::{Road, Tags};
//!
//! let road = Road::new(
//!     vec![Coordinate::new(50.0, 4.0), Coordinate::new(50.0, 4.001)],
//!     Tags::new(),
//! );
//! let route = SmartRouter::new()
//!     .route(&Coordinate::new(50.0, 4.0), &Coordinate::new(50.0, 4.001), &[road])
//!     .unwrap();
//! println!("{}", route.metrics.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod drawer;
mod error;
pub mod graph;
pub mod smart;

pub use drawer::RouteDrawer;
pub use error::{Result, RoutingError, RoutingErrorCode};
pub use graph::{EdgeWeighting, RoadGraph};
pub use smart::{matching_road, RouteMetrics, SmartRoute, SmartRouter};
