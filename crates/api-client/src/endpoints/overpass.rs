//! Overpass API: OSM ways inside a bounding box

use crate::client::GrvlClient;
use crate::error::ApiResult;
use grvlfinder_geo::{BoundingBox, Coordinate};
use grvlfinder_scoring::{Road, Tags};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Highway classes worth riding even without a surface tag
const HIGHWAY_CLASSES: &str = "track|unclassified|service|residential|cycleway";

/// Overpass API interface
#[derive(Clone)]
pub struct OverpassApi {
    client: GrvlClient,
}

impl OverpassApi {
    /// Create a new Overpass API interface
    pub(crate) fn new(client: GrvlClient) -> Self {
        Self { client }
    }

    /// Overpass QL selecting every rideable way in `bbox`
    #[must_use]
    pub fn build_query(bbox: &BoundingBox, timeout_secs: u32) -> String {
        let b = bbox.to_overpass();
        format!(
            "[out:json][timeout:{timeout_secs}];(\
             way[\"surface\"]({b});\
             way[\"tracktype\"]({b});\
             way[\"smoothness\"]({b});\
             way[\"bicycle\"]({b});\
             way[\"incline\"]({b});\
             way[\"highway\"~\"{HIGHWAY_CLASSES}\"]({b});\
             );out body geom;"
        )
    }

    /// Raw interpreter response for `bbox`
    ///
    /// # Errors
    ///
    /// Fails when the request fails or the body is not Overpass JSON.
    #[instrument(skip(self), fields(bbox = %bbox.to_overpass()))]
    pub async fn fetch(&self, bbox: &BoundingBox) -> ApiResult<OverpassResponse> {
        let config = self.client.config();
        let query = Self::build_query(bbox, config.overpass_query_timeout_secs);
        debug!(query_len = query.len(), "Querying Overpass");

        let response: OverpassResponse = self
            .client
            .post_form_json(&config.overpass_url, &[("data", query)])
            .await?;
        info!(elements = response.elements.len(), "Overpass response received");
        Ok(response)
    }

    /// Ways with usable geometry inside `bbox`
    ///
    /// # Errors
    ///
    /// See [`OverpassApi::fetch`].
    pub async fn fetch_ways(&self, bbox: &BoundingBox) -> ApiResult<Vec<OverpassWay>> {
        Ok(self.fetch(bbox).await?.into_ways())
    }
}

/// Interpreter response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverpassResponse {
    /// Returned elements
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One element of the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassElement {
    /// `node`, `way` or `relation`
    #[serde(rename = "type")]
    pub kind: String,
    /// OSM id
    #[serde(default)]
    pub id: i64,
    /// Raw tag values
    #[serde(default)]
    pub tags: BTreeMap<String, Value>,
    /// Inline geometry from `out geom`; gaps are `null`
    #[serde(default)]
    pub geometry: Vec<Option<OverpassPoint>>,
}

/// Geometry vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverpassPoint {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

/// A way ready for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassWay {
    /// OSM id
    pub id: i64,
    /// Tags as strings
    pub tags: Tags,
    /// Geometry
    pub points: Vec<Coordinate>,
}

impl OverpassWay {
    /// Unscored road with this way's geometry and tags
    #[must_use]
    pub fn into_road(self) -> Road {
        Road::new(self.points, self.tags)
    }
}

impl OverpassResponse {
    /// Keep ways with at least two geometry points
    #[must_use]
    pub fn into_ways(self) -> Vec<OverpassWay> {
        self.elements
            .into_iter()
            .filter(|e| e.kind == "way")
            .filter_map(|e| {
                let points: Vec<Coordinate> = e
                    .geometry
                    .into_iter()
                    .flatten()
                    .map(|p| Coordinate::new(p.lat, p.lon))
                    .collect();
                if points.len() < 2 {
                    return None;
                }
                let tags = e
                    .tags
                    .into_iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect();
                Some(OverpassWay {
                    id: e.id,
                    tags,
                    points,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use grvlfinder_core::retry::RetryConfig;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bbox() -> BoundingBox {
        BoundingBox::new(50.87, 4.69, 50.89, 4.71).unwrap()
    }

    fn sample_body() -> Value {
        json!({
            "version": 0.6,
            "elements": [
                {
                    "type": "way",
                    "id": 1,
                    "tags": {"highway": "track", "surface": "gravel", "lanes": 1},
                    "geometry": [{"lat": 50.88, "lon": 4.70}, null, {"lat": 50.881, "lon": 4.701}]
                },
                {
                    "type": "way",
                    "id": 2,
                    "tags": {"highway": "path"},
                    "geometry": [{"lat": 50.88, "lon": 4.70}]
                },
                {"type": "node", "id": 3, "lat": 50.88, "lon": 4.70}
            ]
        })
    }

    #[test]
    fn test_build_query() {
        let query = OverpassApi::build_query(&bbox(), 20);
        let b = "50.870000,4.690000,50.890000,4.710000";
        assert!(query.starts_with("[out:json][timeout:20];("));
        assert!(query.contains(&format!("way[\"surface\"]({b});")));
        assert!(query.contains(&format!(
            "way[\"highway\"~\"track|unclassified|service|residential|cycleway\"]({b});"
        )));
        assert!(query.ends_with(");out body geom;"));
        assert_eq!(query.matches("way[").count(), 6);
    }

    #[test]
    fn test_into_ways() {
        let response: OverpassResponse = serde_json::from_value(sample_body()).unwrap();
        let ways = response.into_ways();

        assert_eq!(ways.len(), 1);
        let way = &ways[0];
        assert_eq!(way.id, 1);
        assert_eq!(way.points.len(), 2);
        assert_eq!(way.tags.get("surface").map(String::as_str), Some("gravel"));
        assert_eq!(way.tags.get("lanes").map(String::as_str), Some("1"));

        let road = way.clone().into_road();
        assert_eq!(road.surface(), Some("gravel"));
        assert_eq!(road.score, 0);
    }

    #[test]
    fn test_missing_elements() {
        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_ways().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_ways() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(body_string_contains("data="))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_overpass_url(format!("{}/api/interpreter", server.uri()))
            .with_retry(RetryConfig::no_retry());
        let client = GrvlClient::with_config(config).unwrap();

        let ways = client.overpass().fetch_ways(&bbox()).await.unwrap();
        assert_eq!(ways.len(), 1);
    }
}
