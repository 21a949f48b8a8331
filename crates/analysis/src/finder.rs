//! Scored roads for an area: the "find gravel" search.

use crate::provider::{ElevationProvider, RoadProvider};
use crate::slope::enrich_roads_with_slope;
use crate::Result;
use grvlfinder_api_client::endpoints::{ElevationApi, OverpassApi, OverpassResponse, OverpassWay};
use grvlfinder_api_client::GrvlClient;
use grvlfinder_core::cache::Cache;
use grvlfinder_geo::BoundingBox;
use grvlfinder_scoring::{BikeProfile, Road, ScoreCalculator, WeatherCondition};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const CACHE_PREFIX: &str = "overpass";

/// Fetches ways from Overpass and scores them for a rider profile.
pub struct RoadFinder<E = ElevationApi> {
    overpass: OverpassApi,
    elevation: E,
    cache: Option<Arc<Cache>>,
    calculator: ScoreCalculator,
    profile: BikeProfile,
}

impl RoadFinder<ElevationApi> {
    /// Finder using the client's Overpass and elevation services.
    #[must_use]
    pub fn new(client: &GrvlClient, profile: BikeProfile) -> Self {
        Self::with_elevation_provider(client, profile, client.elevation())
    }
}

impl<E: ElevationProvider + Sync> RoadFinder<E> {
    /// Finder with a custom elevation source.
    #[must_use]
    pub fn with_elevation_provider(client: &GrvlClient, profile: BikeProfile, elevation: E) -> Self {
        let mut calculator = ScoreCalculator::new(profile.current_weights());
        calculator.set_weather_enabled(profile.weather_enabled());
        Self {
            overpass: client.overpass(),
            elevation,
            cache: None,
            calculator,
            profile,
        }
    }

    /// Keep raw Overpass responses in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Apply recent weather to scores.
    #[must_use]
    pub fn with_weather(mut self, condition: WeatherCondition) -> Self {
        self.calculator = self.calculator.with_weather(condition);
        self
    }

    /// Calculator in use.
    #[must_use]
    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Profile in use.
    #[must_use]
    pub fn profile(&self) -> &BikeProfile {
        &self.profile
    }

    /// Scored roads in `bbox`, best first.
    ///
    /// # Errors
    ///
    /// Fails when Overpass cannot be reached or the cache fails. Elevation failures only
    /// log a warning.
    #[instrument(skip(self), fields(bbox = %bbox.to_overpass()))]
    pub async fn find(&self, bbox: &BoundingBox) -> Result<Vec<Road>> {
        let response = self.load(bbox).await?;
        let roads = response
            .into_ways()
            .into_iter()
            .map(OverpassWay::into_road)
            .collect();
        let roads = self.rate(roads).await;
        info!(roads = roads.len(), "Roads scored");
        Ok(roads)
    }

    /// Score roads, add measured slopes when the profile asks for them, and sort best first.
    pub async fn rate(&self, mut roads: Vec<Road>) -> Vec<Road> {
        for road in &mut roads {
            road.score = self.calculator.score(&road.tags, &road.points);
        }

        if self.profile.should_fetch_elevation_data() && !roads.is_empty() {
            match enrich_roads_with_slope(&mut roads, &self.elevation).await {
                Ok(()) => {
                    for road in &mut roads {
                        if road.max_slope_percent.is_some() {
                            road.score = self.calculator.score_with_slope(
                                &road.tags,
                                &road.points,
                                road.max_slope_percent,
                            );
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Slope data fetch failed, keeping base scores"),
            }
        }

        roads.sort_by(|a, b| b.score.cmp(&a.score));
        roads
    }

    async fn load(&self, bbox: &BoundingBox) -> Result<OverpassResponse> {
        let key = format!("{CACHE_PREFIX}:{}", bbox.cache_key());

        if let Some(cache) = &self.cache {
            if let Some(response) = cache.get::<OverpassResponse>(&key)? {
                debug!(key = %key, "Overpass cache hit");
                return Ok(response);
            }
        }

        let response = self.overpass.fetch(bbox).await?;
        if let Some(cache) = &self.cache {
            cache.set(&key, &response, None)?;
        }
        Ok(response)
    }
}

impl<E: ElevationProvider + Sync> RoadProvider for RoadFinder<E> {
    async fn fetch_roads(&self, bbox: &BoundingBox) -> Result<Vec<Road>> {
        self.find(bbox).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grvlfinder_api_client::endpoints::{OverpassElement, OverpassPoint};
    use grvlfinder_api_client::ClientConfig;
    use grvlfinder_core::cache::CacheConfig;
    use grvlfinder_geo::Coordinate;
    use grvlfinder_scoring::{BikeType, Tags};
    use tokio_test::block_on;

    struct Flat;

    impl ElevationProvider for Flat {
        async fn elevations(&self, points: &[Coordinate]) -> Result<Vec<f64>> {
            Ok(vec![50.0; points.len()])
        }
    }

    /// Climbs 20 m per sample.
    struct Steep;

    impl ElevationProvider for Steep {
        async fn elevations(&self, points: &[Coordinate]) -> Result<Vec<f64>> {
            Ok((0..points.len()).map(|i| f64::from(u32::try_from(i).unwrap()) * 20.0).collect())
        }
    }

    fn client() -> GrvlClient {
        // Port 9 is discard; nothing in these tests should reach it
        let config = ClientConfig::default().with_overpass_url("http://127.0.0.1:9/api/interpreter");
        GrvlClient::with_config(config).unwrap()
    }

    fn road(surface: &str) -> Road {
        let mut tags = Tags::new();
        tags.insert("surface".to_string(), surface.to_string());
        tags.insert("highway".to_string(), "track".to_string());
        let points = (0..6)
            .map(|i| Coordinate::new(50.0, 4.0 + f64::from(i) * 0.001))
            .collect();
        Road::new(points, tags)
    }

    #[test]
    fn test_rate_sorts_best_first() {
        let finder = RoadFinder::with_elevation_provider(&client(), BikeProfile::new(BikeType::Gravel), Flat);
        let roads = block_on(finder.rate(vec![road("asphalt"), road("gravel")]));

        assert_eq!(roads[0].surface(), Some("gravel"));
        assert!(roads[0].score > roads[1].score);
        assert!(roads.iter().all(|r| r.max_slope_percent.is_none()));
    }

    #[test]
    fn test_rate_penalises_measured_slope() {
        let profile = BikeProfile::new(BikeType::GravelBikepacking);
        let flat = RoadFinder::with_elevation_provider(&client(), profile.clone(), Flat);
        let steep = RoadFinder::with_elevation_provider(&client(), profile, Steep);

        let flat_roads = block_on(flat.rate(vec![road("gravel")]));
        let steep_roads = block_on(steep.rate(vec![road("gravel")]));

        assert_eq!(flat_roads[0].max_slope_percent, Some(0.0));
        assert!(steep_roads[0].max_slope_percent.unwrap() > 12.0);
        assert!(steep_roads[0].score < flat_roads[0].score);
    }

    #[test]
    fn test_cached_response_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = Arc::new(
            Cache::new(CacheConfig {
                cache_dir: tmp.path().to_path_buf(),
                ..CacheConfig::default()
            })
            .unwrap(),
        );
        let bbox = BoundingBox::new(49.99, 3.99, 50.01, 4.01).unwrap();
        let response = OverpassResponse {
            elements: vec![OverpassElement {
                kind: "way".to_string(),
                id: 7,
                tags: [("surface".to_string(), serde_json::json!("gravel"))]
                    .into_iter()
                    .collect(),
                geometry: vec![
                    Some(OverpassPoint { lat: 50.0, lon: 4.0 }),
                    Some(OverpassPoint { lat: 50.0, lon: 4.001 }),
                ],
            }],
        };
        cache
            .set(&format!("overpass:{}", bbox.cache_key()), &response, None)
            .unwrap();

        let finder = RoadFinder::with_elevation_provider(&client(), BikeProfile::default(), Flat)
            .with_cache(cache);
        let roads = block_on(finder.fetch_roads(&bbox)).unwrap();

        assert_eq!(roads.len(), 1);
        assert!(roads[0].score > 0);
    }

    #[test]
    fn test_muddy_weather_lowers_gravel() {
        let muddy = WeatherCondition::from_daily_precipitation(&[Some(10.0), Some(8.0)]);
        let dry = RoadFinder::with_elevation_provider(&client(), BikeProfile::default(), Flat);
        let wet = RoadFinder::with_elevation_provider(&client(), BikeProfile::default(), Flat)
            .with_weather(muddy);

        let dry_score = block_on(dry.rate(vec![road("dirt")]))[0].score;
        let wet_score = block_on(wet.rate(vec![road("dirt")]))[0].score;
        assert!(wet_score < dry_score);
    }
}
