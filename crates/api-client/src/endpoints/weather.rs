//! Open-Meteo precipitation history

use crate::client::GrvlClient;
use crate::error::ApiResult;
use chrono::{Days, Local, NaiveDate};
use grvlfinder_geo::{BoundingBox, Coordinate};
use grvlfinder_scoring::{WeatherCondition, DAYS_TO_CHECK};
use serde::Deserialize;
use tracing::{info, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weather API interface
#[derive(Clone)]
pub struct WeatherApi {
    client: GrvlClient,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

impl WeatherApi {
    /// Create a new weather API interface
    pub(crate) fn new(client: GrvlClient) -> Self {
        Self { client }
    }

    /// Daily precipitation sums in mm from a week before `today` up to `today`, oldest first
    ///
    /// # Errors
    ///
    /// Fails when the request fails or the body cannot be decoded.
    #[instrument(skip(self), fields(coord = %coord))]
    pub async fn daily_precipitation(
        &self,
        coord: &Coordinate,
        today: NaiveDate,
    ) -> ApiResult<Vec<Option<f64>>> {
        let start = today
            .checked_sub_days(Days::new(u64::from(DAYS_TO_CHECK)))
            .unwrap_or(today);

        let query = [
            ("latitude", format!("{:.6}", coord.latitude)),
            ("longitude", format!("{:.6}", coord.longitude)),
            ("start_date", start.format(DATE_FORMAT).to_string()),
            ("end_date", today.format(DATE_FORMAT).to_string()),
            ("daily", "precipitation_sum".to_string()),
            ("timezone", "auto".to_string()),
        ];

        let response: ForecastResponse = self
            .client
            .get_json(&self.client.config().weather_url, &query)
            .await?;
        Ok(response
            .daily
            .map(|d| d.precipitation_sum)
            .unwrap_or_default())
    }

    /// Rain over the past week at `coord`
    ///
    /// # Errors
    ///
    /// See [`WeatherApi::daily_precipitation`].
    pub async fn recent_conditions(&self, coord: &Coordinate) -> ApiResult<WeatherCondition> {
        let today = Local::now().date_naive();
        let daily = self.daily_precipitation(coord, today).await?;
        let condition = WeatherCondition::from_daily_precipitation(&daily);
        info!(
            rainy_days = condition.rainy_days,
            total_mm = condition.total_precipitation_mm,
            muddy = condition.is_muddy,
            "Weather conditions loaded"
        );
        Ok(condition)
    }

    /// Rain over the past week at the center of `bbox`
    ///
    /// # Errors
    ///
    /// See [`WeatherApi::daily_precipitation`].
    pub async fn recent_conditions_for_area(
        &self,
        bbox: &BoundingBox,
    ) -> ApiResult<WeatherCondition> {
        self.recent_conditions(&bbox.center()).await
    }
}
