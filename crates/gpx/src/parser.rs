//! GPX reading.

use crate::{GpxError, Result};
use grvlfinder_geo::{path_length_meters, Coordinate};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Points and name read from a GPX document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxRoute {
    /// Name of the first trk or rte that has one
    pub name: Option<String>,
    /// Track points in document order
    pub points: Vec<Coordinate>,
}

impl GpxRoute {
    /// Total length in meters.
    #[must_use]
    pub fn distance_m(&self) -> f64 {
        path_length_meters(&self.points)
    }

    /// True if any point has a non-zero elevation.
    #[must_use]
    pub fn has_elevation_data(&self) -> bool {
        self.points.iter().any(Coordinate::has_elevation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Track,
    Route,
    Waypoint,
}

impl PointKind {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"trkpt" => Some(PointKind::Track),
            b"rtept" => Some(PointKind::Route),
            b"wpt" => Some(PointKind::Waypoint),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Collected {
    name: Option<String>,
    track: Vec<Coordinate>,
    route: Vec<Coordinate>,
    waypoints: Vec<Coordinate>,
}

impl Collected {
    fn push(&mut self, kind: PointKind, point: Coordinate) {
        match kind {
            PointKind::Track => self.track.push(point),
            PointKind::Route => self.route.push(point),
            PointKind::Waypoint => self.waypoints.push(point),
        }
    }

    fn into_route(self) -> Result<GpxRoute> {
        let points = [self.track, self.route, self.waypoints]
            .into_iter()
            .find(|p| !p.is_empty())
            .ok_or(GpxError::NoPoints)?;
        Ok(GpxRoute {
            name: self.name,
            points,
        })
    }
}

fn coordinate_attr(e: &BytesStart<'_>, key: &str) -> Result<f64> {
    let attr = e
        .try_get_attribute(key)?
        .ok_or_else(|| GpxError::InvalidPoint(format!("missing {key}")))?;
    let value = attr.unescape_value()?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| GpxError::InvalidPoint(format!("{key}=\"{value}\"")))
}

fn read_point(e: &BytesStart<'_>) -> Result<Coordinate> {
    let point = Coordinate::new(coordinate_attr(e, "lat")?, coordinate_attr(e, "lon")?);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(GpxError::InvalidPoint(point.to_string()))
    }
}

/// Parse GPX from any buffered reader.
///
/// Track points win over route points, which win over waypoints.
///
/// # Errors
///
/// Fails on malformed XML, unparsable coordinates, or when the document has no points.
pub fn parse_reader<R: BufRead>(source: R) -> Result<GpxRoute> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut collected = Collected::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<(PointKind, Coordinate)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = e.local_name().as_ref().to_vec();
                if let Some(kind) = PointKind::from_tag(&tag) {
                    current = Some((kind, read_point(e)?));
                }
                stack.push(tag);
            }
            Event::Empty(ref e) => {
                if let Some(kind) = PointKind::from_tag(e.local_name().as_ref()) {
                    collected.push(kind, read_point(e)?);
                }
            }
            Event::Text(ref t) => {
                let tag = stack.last().map(Vec::as_slice);
                let parent = stack.len().checked_sub(2).and_then(|i| stack.get(i));
                match (tag, parent.map(Vec::as_slice)) {
                    (Some(b"ele"), _) => {
                        if let Some((_, point)) = current.as_mut() {
                            point.elevation = t.unescape()?.trim().parse::<f64>().ok();
                        }
                    }
                    (Some(b"name"), Some(b"trk" | b"rte")) if collected.name.is_none() => {
                        collected.name = Some(t.unescape()?.trim().to_string());
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                if PointKind::from_tag(e.local_name().as_ref()).is_some() {
                    if let Some((kind, point)) = current.take() {
                        collected.push(kind, point);
                    }
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let route = collected.into_route()?;
    debug!(points = route.points.len(), name = ?route.name, "Parsed GPX");
    Ok(route)
}

/// Parse GPX text.
///
/// # Errors
///
/// See [`parse_reader`].
pub fn parse_str(xml: &str) -> Result<GpxRoute> {
    parse_reader(xml.as_bytes())
}

/// Parse a GPX file.
///
/// # Errors
///
/// Fails when the file cannot be opened, otherwise as [`parse_reader`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<GpxRoute> {
    let file = File::open(path.as_ref())?;
    parse_reader(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Metadata name</name></metadata>
  <trk>
    <name>Morning &amp; gravel</name>
    <trkseg>
      <trkpt lat="50.8798" lon="4.7005"><ele>31.5</ele><name>pt</name></trkpt>
      <trkpt lat="50.8810" lon="4.7020"><ele>n/a</ele></trkpt>
      <trkpt lat="50.8825" lon="4.7041"/>
    </trkseg>
  </trk>
  <wpt lat="1.0" lon="1.0"/>
</gpx>"#;

    #[test]
    fn test_parse_track() {
        let route = parse_str(TRACK).unwrap();
        assert_eq!(route.name.as_deref(), Some("Morning & gravel"));
        assert_eq!(route.points.len(), 3);
        assert_eq!(route.points[0].elevation, Some(31.5));
        assert_eq!(route.points[1].elevation, None);
        assert_eq!(route.points[2].elevation, None);
        assert!(route.has_elevation_data());
        assert!(route.distance_m() > 300.0);
    }

    #[test]
    fn test_route_points_when_no_track() {
        let xml = r#"<gpx><rte><name>Loop</name>
            <rtept lat="50.0" lon="4.0"></rtept>
            <rtept lat="50.001" lon="4.0"><ele>0</ele></rtept>
        </rte><wpt lat="1.0" lon="1.0"/></gpx>"#;
        let route = parse_str(xml).unwrap();
        assert_eq!(route.name.as_deref(), Some("Loop"));
        assert_eq!(route.points.len(), 2);
        assert!(!route.has_elevation_data());
    }

    #[test]
    fn test_waypoints_last_resort() {
        let xml = r#"<gpx><wpt lat="50.0" lon="4.0"><ele>12</ele></wpt></gpx>"#;
        let route = parse_str(xml).unwrap();
        assert_eq!(route.name, None);
        assert_eq!(route.points, vec![Coordinate::new(50.0, 4.0).with_elevation(12.0)]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_str("<gpx></gpx>"), Err(GpxError::NoPoints)));
        assert!(matches!(
            parse_str(r#"<gpx><wpt lat="abc" lon="4.0"/></gpx>"#),
            Err(GpxError::InvalidPoint(_))
        ));
        assert!(matches!(
            parse_str(r#"<gpx><wpt lon="4.0"/></gpx>"#),
            Err(GpxError::InvalidPoint(_))
        ));
        assert!(matches!(
            parse_str(r#"<gpx><wpt lat="95.0" lon="4.0"/></gpx>"#),
            Err(GpxError::InvalidPoint(_))
        ));
        assert!(parse_str("<gpx><trk></gpx>").is_err());
    }

    #[test]
    fn test_parse_file_missing() {
        assert!(matches!(
            parse_file("/definitely/not/here.gpx"),
            Err(GpxError::Io(_))
        ));
    }
}
