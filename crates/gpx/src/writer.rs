//! GPX 1.1 export.

use crate::{GpxError, Result};
use chrono::{DateTime, Duration, Utc};
use grvlfinder_geo::Coordinate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// File name used when none is given.
pub const DEFAULT_FILE_NAME: &str = "route.gpx";

/// Names and timestamps written into an exported file.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// `creator` attribute
    pub creator: String,
    /// `<metadata><name>`
    pub metadata_name: String,
    /// `<trk><name>`
    pub track_name: String,
    /// Time of the first point; now when unset
    pub start_time: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            creator: "GravelRideApp".to_string(),
            metadata_name: "Exported route".to_string(),
            track_name: "Route".to_string(),
            start_time: None,
        }
    }
}

impl ExportOptions {
    /// Set the track name.
    #[must_use]
    pub fn with_track_name(mut self, name: impl Into<String>) -> Self {
        self.track_name = name.into();
        self
    }

    /// Fix the timestamp of the first point.
    #[must_use]
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }
}

/// Writes a single-segment track.
#[derive(Debug, Clone, Default)]
pub struct GpxWriter {
    options: ExportOptions,
}

impl GpxWriter {
    /// Writer with the given options.
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Write GPX into any sink.
    ///
    /// # Errors
    ///
    /// Fails on an empty route or when the sink fails.
    pub fn write_to<W: Write>(&self, sink: W, points: &[Coordinate]) -> Result<()> {
        if points.is_empty() {
            return Err(GpxError::EmptyRoute);
        }
        let start = self.options.start_time.unwrap_or_else(Utc::now);
        let mut writer = Writer::new_with_indent(sink, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut gpx = BytesStart::new("gpx");
        gpx.push_attribute(("version", "1.1"));
        gpx.push_attribute(("creator", self.options.creator.as_str()));
        gpx.push_attribute(("xmlns", GPX_NAMESPACE));
        gpx.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        gpx.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
        writer.write_event(Event::Start(gpx))?;

        writer.write_event(Event::Start(BytesStart::new("metadata")))?;
        write_text_element(&mut writer, "name", &self.options.metadata_name)?;
        write_text_element(&mut writer, "time", &start.format(TIME_FORMAT).to_string())?;
        writer.write_event(Event::End(BytesEnd::new("metadata")))?;

        writer.write_event(Event::Start(BytesStart::new("trk")))?;
        write_text_element(&mut writer, "name", &self.options.track_name)?;
        writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

        for (offset, point) in (0_i64..).zip(points) {
            let lat = format!("{:.6}", point.latitude);
            let lon = format!("{:.6}", point.longitude);
            let mut trkpt = BytesStart::new("trkpt");
            trkpt.push_attribute(("lat", lat.as_str()));
            trkpt.push_attribute(("lon", lon.as_str()));
            writer.write_event(Event::Start(trkpt))?;

            if let Some(ele) = point.elevation {
                write_text_element(&mut writer, "ele", &format!("{ele:.1}"))?;
            }
            let time = start + Duration::seconds(offset);
            write_text_element(&mut writer, "time", &time.format(TIME_FORMAT).to_string())?;

            writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
        writer.write_event(Event::End(BytesEnd::new("trk")))?;
        writer.write_event(Event::End(BytesEnd::new("gpx")))?;
        writer.into_inner().write_all(b"\n")?;
        Ok(())
    }

    /// Write GPX to a string.
    ///
    /// # Errors
    ///
    /// Fails on an empty route.
    pub fn write_string(&self, points: &[Coordinate]) -> Result<String> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer, points)?;
        String::from_utf8(buffer.into_inner())
            .map_err(|e| GpxError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Render points as a GPX 1.1 document.
///
/// # Errors
///
/// Returns [`GpxError::EmptyRoute`] for an empty slice.
pub fn write_gpx(points: &[Coordinate], options: &ExportOptions) -> Result<String> {
    GpxWriter::new(options.clone()).write_string(points)
}

fn normalize_file_name(file_name: Option<&str>) -> String {
    let name = file_name.map(str::trim).filter(|n| !n.is_empty());
    match name {
        None => DEFAULT_FILE_NAME.to_string(),
        Some(n) if n.to_lowercase().ends_with(".gpx") => n.to_string(),
        Some(n) => format!("{n}.gpx"),
    }
}

/// Write points to `<dir>/<file_name>`, creating `dir` if needed.
///
/// Returns the written path.
///
/// # Errors
///
/// Fails on an empty route or any IO error.
pub fn export_to_file(
    points: &[Coordinate],
    dir: &Path,
    file_name: Option<&str>,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let content = write_gpx(points, options)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(normalize_file_name(file_name));
    fs::write(&path, content)?;
    info!(path = %path.display(), points = points.len(), "Exported GPX");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;
    use chrono::TimeZone;

    fn fixed_options() -> ExportOptions {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        ExportOptions::default().with_start_time(start)
    }

    fn points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(50.8798, 4.7005).with_elevation(31.0),
            Coordinate::new(50.881, 4.702),
        ]
    }

    #[test]
    fn test_document_layout() {
        let xml = write_gpx(&points(), &fixed_options()).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"creator="GravelRideApp""#));
        assert!(xml.contains(r#"xmlns="http://www.topografix.com/GPX/1/1""#));
        assert!(xml.contains("<name>Exported route</name>"));
        assert!(xml.contains("<name>Route</name>"));
        assert!(xml.contains(r#"<trkpt lat="50.879800" lon="4.700500">"#));
        assert!(xml.contains("<ele>31.0</ele>"));
        assert_eq!(xml.matches("<ele>").count(), 1);
        assert!(xml.contains("<time>2024-05-01T10:00:00Z</time>"));
        assert!(xml.contains("<time>2024-05-01T10:00:01Z</time>"));
    }

    #[test]
    fn test_written_file_reads_back() {
        let xml = write_gpx(&points(), &fixed_options().with_track_name("Loop")).unwrap();
        let route = parse_str(&xml).unwrap();
        assert_eq!(route.name.as_deref(), Some("Loop"));
        assert_eq!(route.points.len(), 2);
        assert_eq!(route.points[0].elevation, Some(31.0));
        assert_eq!(route.points[1].elevation, None);
    }

    #[test]
    fn test_empty_route() {
        assert!(matches!(
            write_gpx(&[], &ExportOptions::default()),
            Err(GpxError::EmptyRoute)
        ));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(normalize_file_name(None), "route.gpx");
        assert_eq!(normalize_file_name(Some("  ")), "route.gpx");
        assert_eq!(normalize_file_name(Some("ride")), "ride.gpx");
        assert_eq!(normalize_file_name(Some("Ride.GPX")), "Ride.GPX");
    }

    #[test]
    fn test_export_to_file_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let path = export_to_file(&points(), &dir, Some("leuven"), &fixed_options()).unwrap();

        assert_eq!(path, dir.join("leuven.gpx"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<trkseg>"));
    }
}
