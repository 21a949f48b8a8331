//! OSRM bicycle routing

use crate::client::GrvlClient;
use crate::error::{ApiError, ApiResult};
use grvlfinder_geo::Coordinate;
use serde::Deserialize;
use tracing::{instrument, warn};

/// OSRM API interface
#[derive(Clone)]
pub struct OsrmApi {
    client: GrvlClient,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

impl OsrmApi {
    /// Create a new OSRM API interface
    pub(crate) fn new(client: GrvlClient) -> Self {
        Self { client }
    }

    /// Route URL for `start` to `end`
    #[must_use]
    pub fn build_route_url(
        base: &str,
        start: &Coordinate,
        end: &Coordinate,
        api_key: Option<&str>,
    ) -> String {
        let separator = if base.ends_with('/') { "" } else { "/" };
        let mut url = format!(
            "{base}{separator}{},{};{},{}?overview=full&geometries=geojson",
            start.longitude, start.latitude, end.longitude, end.latitude
        );
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            url.push_str("&api_key=");
            url.push_str(key);
        }
        url
    }

    /// Route geometry from `start` to `end`
    ///
    /// # Errors
    ///
    /// Fails when the request fails or no route is returned.
    #[instrument(skip(self), fields(start = %start, end = %end))]
    pub async fn route(&self, start: &Coordinate, end: &Coordinate) -> ApiResult<Vec<Coordinate>> {
        let config = self.client.config();
        let url = Self::build_route_url(&config.osrm_url, start, end, config.osrm_api_key.as_deref());

        let response: RouteResponse = self.client.get_json(&url, &[]).await?;
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::unexpected("no route returned"))?;

        let points: Vec<Coordinate> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coordinate::new(lat, lon))
            .collect();
        if points.is_empty() {
            return Err(ApiError::unexpected("route has no geometry"));
        }
        Ok(points)
    }

    /// Route geometry, or the straight segment when routing fails
    pub async fn route_or_direct(&self, start: &Coordinate, end: &Coordinate) -> Vec<Coordinate> {
        match self.route(start, end).await {
            Ok(points) => points,
            Err(e) => {
                warn!(error = %e, "Routing failed, using straight line");
                vec![*start, *end]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use grvlfinder_core::retry::RetryConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GrvlClient {
        let mut config = ClientConfig::default()
            .with_osrm_url(format!("{}/route/v1/bicycle", server.uri()))
            .with_retry(RetryConfig::no_retry());
        if let Some(key) = api_key {
            config = config.with_osrm_api_key(key);
        }
        GrvlClient::with_config(config).unwrap()
    }

    #[test]
    fn test_build_route_url() {
        let start = Coordinate::new(50.5, 4.25);
        let end = Coordinate::new(50.75, 4.5);

        assert_eq!(
            OsrmApi::build_route_url("https://router.example/route/v1/bicycle/", &start, &end, None),
            "https://router.example/route/v1/bicycle/4.25,50.5;4.5,50.75?overview=full&geometries=geojson"
        );
        assert_eq!(
            OsrmApi::build_route_url("https://router.example/bike", &start, &end, Some("k1")),
            "https://router.example/bike/4.25,50.5;4.5,50.75?overview=full&geometries=geojson&api_key=k1"
        );
        assert!(
            !OsrmApi::build_route_url("http://r/", &start, &end, Some("")).contains("api_key")
        );
    }

    #[tokio::test]
    async fn test_route_parses_lon_lat() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/route/v1/bicycle/4.7,50.88;4.71,50.89"))
            .and(query_param("overview", "full"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "Ok",
                "routes": [{"geometry": {"type": "LineString", "coordinates": [[4.7, 50.88], [4.705, 50.885], [4.71, 50.89]]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let points = client_for(&server, Some("secret"))
            .osrm()
            .route(&Coordinate::new(50.88, 4.7), &Coordinate::new(50.89, 4.71))
            .await
            .unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Coordinate::new(50.885, 4.705));
    }

    #[tokio::test]
    async fn test_route_or_direct_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "NoRoute", "routes": []})))
            .mount(&server)
            .await;

        let start = Coordinate::new(50.0, 4.0);
        let end = Coordinate::new(50.1, 4.1);
        let api = client_for(&server, None).osrm();

        assert!(matches!(
            api.route(&start, &end).await,
            Err(ApiError::UnexpectedResponse(_))
        ));
        assert_eq!(api.route_or_direct(&start, &end).await, vec![start, end]);
    }
}
