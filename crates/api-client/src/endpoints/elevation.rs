//! OpenTopoData elevation lookups

use crate::client::GrvlClient;
use crate::error::{ApiError, ApiResult};
use grvlfinder_geo::Coordinate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Elevation assumed when the service has no value for a point
pub const DEFAULT_ELEVATION_M: f64 = 100.0;

/// Elevation API interface
#[derive(Clone)]
pub struct ElevationApi {
    client: GrvlClient,
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: Option<f64>,
}

impl ElevationApi {
    /// Create a new elevation API interface
    pub(crate) fn new(client: GrvlClient) -> Self {
        Self { client }
    }

    /// Elevations in meters, one per point and in order
    ///
    /// Points are sent in batches of the configured size with a pause in between.
    /// A batch that fails yields [`DEFAULT_ELEVATION_M`] for each of its points.
    #[instrument(skip(self, points), fields(points = points.len()))]
    pub async fn lookup(&self, points: &[Coordinate]) -> Vec<f64> {
        let config = self.client.config();
        let batch_size = config.elevation_batch_size.max(1);
        let mut elevations = Vec::with_capacity(points.len());

        for (index, batch) in points.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(config.elevation_batch_delay).await;
            }
            match self.lookup_batch(batch).await {
                Ok(values) => elevations.extend(values),
                Err(e) => {
                    warn!(batch = index, error = %e, "Elevation batch failed, using defaults");
                    elevations.extend(std::iter::repeat_n(DEFAULT_ELEVATION_M, batch.len()));
                }
            }
        }

        debug!(count = elevations.len(), "Elevation lookup finished");
        elevations
    }

    /// One request for up to a batch of points
    ///
    /// The result always has `points.len()` entries.
    ///
    /// # Errors
    ///
    /// Fails when the request fails or the service reports a status other than `OK`.
    pub async fn lookup_batch(&self, points: &[Coordinate]) -> ApiResult<Vec<f64>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let locations = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.latitude, p.longitude))
            .collect::<Vec<_>>()
            .join("|");

        let response: ElevationResponse = self
            .client
            .get_json(&self.client.config().elevation_url, &[("locations", locations)])
            .await?;

        if response.status != "OK" {
            return Err(ApiError::unexpected(format!(
                "elevation status {}: {}",
                response.status,
                response.error.unwrap_or_default()
            )));
        }

        let mut values: Vec<f64> = response
            .results
            .into_iter()
            .map(|r| r.elevation.unwrap_or(DEFAULT_ELEVATION_M))
            .collect();
        values.resize(points.len(), DEFAULT_ELEVATION_M);
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use grvlfinder_core::rate_limit::RateLimitConfig;
    use grvlfinder_core::retry::RetryConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, batch_size: usize) -> GrvlClient {
        let mut config = ClientConfig::default()
            .with_elevation_url(format!("{}/v1/srtm30m", server.uri()))
            .with_retry(RetryConfig::no_retry())
            .with_elevation_batching(batch_size, Duration::from_millis(1));
        config.elevation_rate_limit = RateLimitConfig::per_second(1000);
        config.rate_limit = RateLimitConfig::per_second(1000);
        GrvlClient::with_config(config).unwrap()
    }

    fn points(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(50.0 + f64::from(u32::try_from(i).unwrap()) * 0.001, 4.0))
            .collect()
    }

    #[tokio::test]
    async fn test_lookup_batch_formats_locations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/srtm30m"))
            .and(query_param("locations", "50.000000,4.000000|50.001000,4.000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [{"elevation": 31.5}, {"elevation": null}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let values = client_for(&server, 10)
            .elevation()
            .lookup_batch(&points(2))
            .await
            .unwrap();
        assert_eq!(values, vec![31.5, DEFAULT_ELEVATION_M]);
    }

    #[tokio::test]
    async fn test_short_result_is_padded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [{"elevation": 12.0}]
            })))
            .mount(&server)
            .await;

        let values = client_for(&server, 10)
            .elevation()
            .lookup_batch(&points(3))
            .await
            .unwrap();
        assert_eq!(values, vec![12.0, DEFAULT_ELEVATION_M, DEFAULT_ELEVATION_M]);
    }

    #[tokio::test]
    async fn test_bad_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "INVALID_REQUEST",
                "error": "Too many locations"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server, 10).elevation().lookup_batch(&points(1)).await;
        assert!(matches!(result, Err(ApiError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_lookup_batches_and_defaults_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let values = client_for(&server, 2).elevation().lookup(&points(5)).await;
        assert_eq!(values, vec![DEFAULT_ELEVATION_M; 5]);
    }
}
