//! Token-bucket rate limiting for public map services
//!
//! Overpass, OpenTopoData, Open-Meteo and the OSRM demo server all publish fair-use
//! limits. Each host gets its own bucket; hosts with stricter limits than the default
//! are registered with [`RateLimiter::with_limit`]. A refused request learns how long
//! to wait, so callers sleep rather than fail.
//!
//! # Example
//!
//! ```rust
//! use grvlfinder_core::rate_limit::{RateLimitConfig, RateLimiter};
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::new(RateLimitConfig::per_second(10))
//!     .with_limit("api.opentopodata.org", RateLimitConfig::strict(1, Duration::from_secs(1)));
//!
//! assert!(limiter.acquire("api.opentopodata.org").is_ok());
//! let wait = limiter.acquire("api.opentopodata.org").unwrap_err();
//! assert!(wait <= Duration::from_secs(1));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Requests allowed per window for one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Extra requests a quiet host may send at once
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

impl RateLimitConfig {
    /// Exactly `max_requests` per `window`, no burst
    #[must_use]
    pub fn strict(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            burst: 0,
        }
    }

    /// `max` per second with half of that again as burst
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(1),
            burst: max / 2,
        }
    }

    /// `max` per minute with a quarter of that as burst
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(60),
            burst: max / 4,
        }
    }

    /// Bucket size
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.max_requests.saturating_add(self.burst)
    }

    fn tokens_per_sec(&self) -> f64 {
        f64::from(self.max_requests) / self.window.as_secs_f64().max(f64::EPSILON)
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
    config: RateLimitConfig,
}

impl Bucket {
    fn full(config: RateLimitConfig) -> Self {
        Self {
            tokens: f64::from(config.capacity()),
            refilled_at: Instant::now(),
            config,
        }
    }

    fn refill(&mut self, now: Instant) {
        let earned = now.duration_since(self.refilled_at).as_secs_f64() * self.config.tokens_per_sec();
        self.tokens = (self.tokens + earned).min(f64::from(self.config.capacity()));
        self.refilled_at = now;
    }

    fn take(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        let rate = self.config.tokens_per_sec();
        if rate <= 0.0 {
            return Err(self.config.window);
        }
        Err(Duration::from_secs_f64((1.0 - self.tokens) / rate))
    }
}

/// One token bucket per host
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    per_host: HashMap<String, RateLimitConfig>,
    default_config: RateLimitConfig,
}

impl RateLimiter {
    /// Limiter applying `config` to every host without its own limit
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            per_host: HashMap::new(),
            default_config: config,
        }
    }

    /// Give `host` its own limit
    #[must_use]
    pub fn with_limit(mut self, host: impl Into<String>, config: RateLimitConfig) -> Self {
        self.per_host.insert(host.into(), config);
        self
    }

    /// Limit in force for `host`
    #[must_use]
    pub fn config_for(&self, host: &str) -> &RateLimitConfig {
        self.per_host.get(host).unwrap_or(&self.default_config)
    }

    /// Take one token for `host`, or learn how long until one is available.
    ///
    /// # Errors
    ///
    /// Returns the time to wait when the bucket is empty.
    pub fn acquire(&self, host: &str) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        buckets
            .entry(host.to_string())
            .or_insert_with(|| Bucket::full(self.config_for(host).clone()))
            .take(Instant::now())
    }

    /// Whole tokens currently left for `host`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn available(&self, host: &str) -> u32 {
        let mut buckets = self.buckets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match buckets.get_mut(host) {
            Some(bucket) => {
                bucket.refill(Instant::now());
                bucket.tokens as u32
            }
            None => self.config_for(host).capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_limit_refuses_after_capacity() {
        let limiter = RateLimiter::new(RateLimitConfig::strict(3, Duration::from_secs(1)));

        for _ in 0..3 {
            assert!(limiter.acquire("overpass-api.de").is_ok());
        }
        let wait = limiter.acquire("overpass-api.de").unwrap_err();
        assert!(wait > Duration::ZERO && wait <= Duration::from_millis(334));
    }

    #[test]
    fn test_burst_adds_to_capacity() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(1),
            burst: 2,
        });

        for _ in 0..4 {
            assert!(limiter.acquire("host").is_ok());
        }
        assert!(limiter.acquire("host").is_err());
    }

    #[test]
    fn test_hosts_have_separate_buckets() {
        let limiter = RateLimiter::new(RateLimitConfig::strict(1, Duration::from_secs(1)));

        assert!(limiter.acquire("api.open-meteo.com").is_ok());
        assert!(limiter.acquire("api.open-meteo.com").is_err());
        assert!(limiter.acquire("router.project-osrm.org").is_ok());
    }

    #[test]
    fn test_host_limit_overrides_default() {
        let limiter = RateLimiter::new(RateLimitConfig::per_second(10))
            .with_limit("api.opentopodata.org", RateLimitConfig::strict(1, Duration::from_secs(60)));

        assert!(limiter.acquire("api.opentopodata.org").is_ok());
        let wait = limiter.acquire("api.opentopodata.org").unwrap_err();
        assert!(wait > Duration::from_secs(50));

        assert_eq!(limiter.config_for("overpass-api.de").capacity(), 15);
        assert_eq!(limiter.available("overpass-api.de"), 15);
    }

    #[test]
    fn test_tokens_come_back() {
        let limiter = RateLimiter::new(RateLimitConfig::strict(1, Duration::from_millis(20)));
        assert!(limiter.acquire("host").is_ok());
        assert_eq!(limiter.available("host"), 0);

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.acquire("host").is_ok());
    }

    #[test]
    fn test_default_is_sixty_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 60);
        assert_eq!(config.window, Duration::from_secs(60));
        assert_eq!(config.capacity(), 75);
    }
}
