//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one public map service.
//!
//! | Module | Service | Description |
//! |--------|---------|-------------|
//! | `overpass` | Overpass API | OSM ways with tags and geometry inside a bounding box |
//! | `elevation` | OpenTopoData | Batched SRTM elevation lookups |
//! | `weather` | Open-Meteo | Daily precipitation sums |
//! | `osrm` | OSRM | Bicycle routes between two points |

pub mod elevation;
pub mod osrm;
pub mod overpass;
pub mod weather;

pub use elevation::{ElevationApi, DEFAULT_ELEVATION_M};
pub use osrm::OsrmApi;
pub use overpass::{OverpassApi, OverpassElement, OverpassPoint, OverpassResponse, OverpassWay};
pub use weather::WeatherApi;
