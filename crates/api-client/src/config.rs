//! Configuration for the grvlfinder API client
//!
//! Endpoints default to the public services; each can be overridden from the
//! config file's `[services]` section or from `GRVLFINDER_*` environment variables.

use crate::error::{ApiError, ApiResult};
use grvlfinder_core::config::{
    default_elevation_url, default_osrm_url, default_overpass_url, default_weather_url,
    ServicesConfig,
};
use grvlfinder_core::rate_limit::RateLimitConfig;
use grvlfinder_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Overpass interpreter endpoint
    pub overpass_url: String,
    /// OpenTopoData dataset endpoint
    pub elevation_url: String,
    /// Open-Meteo forecast endpoint
    pub weather_url: String,
    /// OSRM route endpoint, profile included
    pub osrm_url: String,
    /// Optional OSRM API key, sent as `api_key`
    pub osrm_api_key: Option<String>,
    /// `User-Agent` header
    pub user_agent: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limit applied per host
    pub rate_limit: RateLimitConfig,
    /// Stricter limit for the elevation host
    pub elevation_rate_limit: RateLimitConfig,
    /// Points per elevation request
    pub elevation_batch_size: usize,
    /// Pause between elevation batches
    #[serde(with = "duration_millis")]
    pub elevation_batch_delay: Duration,
    /// `[timeout:N]` of Overpass queries, in seconds
    pub overpass_query_timeout_secs: u32,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

fn default_user_agent() -> String {
    format!("grvlfinder/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            elevation_url: default_elevation_url(),
            weather_url: default_weather_url(),
            osrm_url: default_osrm_url(),
            osrm_api_key: None,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::per_minute(60),
            // OpenTopoData allows one call per second
            elevation_rate_limit: RateLimitConfig::strict(1, Duration::from_secs(1)),
            elevation_batch_size: 10,
            elevation_batch_delay: Duration::from_millis(600),
            overpass_query_timeout_secs: 20,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `GRVLFINDER_OVERPASS_URL`
    /// - `GRVLFINDER_ELEVATION_URL`
    /// - `GRVLFINDER_WEATHER_URL`
    /// - `GRVLFINDER_OSRM_URL`
    /// - `GRVLFINDER_OSRM_API_KEY`
    /// - `GRVLFINDER_TIMEOUT_SECS`: Request timeout in seconds
    ///
    /// # Errors
    ///
    /// Fails when the resulting configuration does not validate.
    pub fn from_env() -> ApiResult<Self> {
        let config = Self::default().with_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("GRVLFINDER_OVERPASS_URL") {
            self.overpass_url = url;
        }
        if let Some(url) = lookup("GRVLFINDER_ELEVATION_URL") {
            self.elevation_url = url;
        }
        if let Some(url) = lookup("GRVLFINDER_WEATHER_URL") {
            self.weather_url = url;
        }
        if let Some(url) = lookup("GRVLFINDER_OSRM_URL") {
            self.osrm_url = url;
        }
        if let Some(key) = lookup("GRVLFINDER_OSRM_API_KEY").filter(|k| !k.is_empty()) {
            self.osrm_api_key = Some(key);
        }
        if let Some(secs) = lookup("GRVLFINDER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Build from the config file's `[services]` section, then apply environment overrides.
    #[must_use]
    pub fn from_services(services: &ServicesConfig) -> Self {
        let mut config = Self {
            overpass_url: services.overpass_url.clone(),
            elevation_url: services.elevation_url.clone(),
            weather_url: services.weather_url.clone(),
            osrm_url: services.osrm_url.clone(),
            osrm_api_key: services.osrm_api_key.clone(),
            timeout: Duration::from_secs(services.timeout_secs),
            ..Self::default()
        };
        if let Some(ref agent) = services.user_agent {
            config.user_agent.clone_from(agent);
        }
        config.with_overrides(|key| env::var(key).ok())
    }

    /// Builder-style method to set the Overpass URL
    #[must_use]
    pub fn with_overpass_url(mut self, url: impl Into<String>) -> Self {
        self.overpass_url = url.into();
        self
    }

    /// Builder-style method to set the elevation URL
    #[must_use]
    pub fn with_elevation_url(mut self, url: impl Into<String>) -> Self {
        self.elevation_url = url.into();
        self
    }

    /// Builder-style method to set the weather URL
    #[must_use]
    pub fn with_weather_url(mut self, url: impl Into<String>) -> Self {
        self.weather_url = url.into();
        self
    }

    /// Builder-style method to set the OSRM URL
    #[must_use]
    pub fn with_osrm_url(mut self, url: impl Into<String>) -> Self {
        self.osrm_url = url.into();
        self
    }

    /// Builder-style method to set the OSRM API key
    #[must_use]
    pub fn with_osrm_api_key(mut self, key: impl Into<String>) -> Self {
        self.osrm_api_key = Some(key.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set rate limit config
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Builder-style method to set elevation batching
    #[must_use]
    pub fn with_elevation_batching(mut self, batch_size: usize, delay: Duration) -> Self {
        self.elevation_batch_size = batch_size;
        self.elevation_batch_delay = delay;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Fails on an empty or non-HTTP URL, a zero timeout or a zero batch size.
    pub fn validate(&self) -> ApiResult<()> {
        for (name, url) in [
            ("overpass_url", &self.overpass_url),
            ("elevation_url", &self.elevation_url),
            ("weather_url", &self.weather_url),
            ("osrm_url", &self.osrm_url),
        ] {
            if url.is_empty() {
                return Err(ApiError::config(format!("{name} cannot be empty")));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::config(format!(
                    "{name} must start with http:// or https://"
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.elevation_batch_size == 0 {
            return Err(ApiError::config("elevation_batch_size cannot be zero"));
        }

        Ok(())
    }
}
