//! GPX support for grvlfinder.
//!
//! - **Parsing**: tracks, routes or waypoints from GPX 1.0/1.1 via `quick-xml` events
//! - **Export**: single-track GPX 1.1 with per-point timestamps
//!
//! # Example
//!
//! ```
//! use grvlfinder_gpx::{parse_str, write_gpx, ExportOptions};
//!
//! let xml = r#"<gpx><trk><name>Demo</name><trkseg>
//!     <trkpt lat="50.0" lon="4.0"/><trkpt lat="50.001" lon="4.0"/>
//! </trkseg></trk></gpx>"#;
//!
//! let route = parse_str(xml).unwrap();
//! assert_eq!(route.points.len(), 2);
//!
//! let exported = write_gpx(&route.points, &ExportOptions::default()).unwrap();
//! assert!(exported.contains("<trkseg>"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod parser;
mod writer;

pub use error::{GpxError, GpxErrorCode, Result};
pub use parser::{parse_file, parse_reader, parse_str, GpxRoute};
pub use writer::{export_to_file, write_gpx, ExportOptions, GpxWriter, DEFAULT_FILE_NAME};
