//! Async seams between analysis and the map services.

use crate::Result;
use grvlfinder_api_client::endpoints::ElevationApi;
use grvlfinder_geo::{BoundingBox, Coordinate};
use grvlfinder_scoring::Road;
use std::future::Future;

/// Source of scored roads for an area.
pub trait RoadProvider {
    /// Scored roads inside `bbox`.
    fn fetch_roads(&self, bbox: &BoundingBox) -> impl Future<Output = Result<Vec<Road>>> + Send;
}

/// Source of terrain elevations.
pub trait ElevationProvider {
    /// One elevation in meters per point, in order.
    fn elevations(&self, points: &[Coordinate]) -> impl Future<Output = Result<Vec<f64>>> + Send;
}

impl ElevationProvider for ElevationApi {
    async fn elevations(&self, points: &[Coordinate]) -> Result<Vec<f64>> {
        Ok(self.lookup(points).await)
    }
}
