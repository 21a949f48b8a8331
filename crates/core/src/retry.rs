//! Retry schedule and circuit breaker
//!
//! Public map services (Overpass in particular) answer 429 or 504 when busy. A
//! [`RetryConfig`] spaces out repeated attempts; a [`CircuitBreaker`] shared by all
//! requests of a client stops sending traffic to a service that keeps failing, and
//! lets a trial request through once the cool-down has passed.
//!
//! # Example
//!
//! ```rust
//! use grvlfinder_core::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let config = RetryConfig { jitter: false, ..RetryConfig::default() };
//! assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Backoff schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Longest wait between attempts
    pub max_delay: Duration,
    /// Growth of the wait per attempt
    pub backoff_multiplier: f64,
    /// Stretch each wait by up to a quarter so parallel clients spread out
    pub jitter: bool,
    /// Give up on a single attempt after this long
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
            attempt_timeout: None,
        }
    }
}

impl RetryConfig {
    /// One attempt, no waiting
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
            attempt_timeout: None,
        }
    }

    /// Wait before `attempt` (0-based). The first attempt never waits.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let Some(retry) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };

        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = (self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        let stretch = if self.jitter { 1.0 + jitter_fraction() * 0.25 } else { 1.0 };

        Duration::from_secs_f64(secs * stretch)
    }
}

/// Pseudo-random value in `[0, 1)` from the std hasher's random keys
#[allow(clippy::cast_precision_loss)]
fn jitter_fraction() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    (RandomState::new().hash_one(Instant::now()) % 1024) as f64 / 1024.0
}

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests flow
    Closed,
    /// Requests are refused until the cool-down has passed
    Open,
    /// Trial requests decide whether to close again
    HalfOpen,
}

/// Breaker thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Successful trial requests that close it again
    pub success_threshold: u32,
    /// Cool-down before a trial request is allowed
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker shared by all requests of a client
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Breaker>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    /// Closed breaker with the given thresholds
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Breaker {
                state: CircuitState::Closed,
                failures: 0,
                trial_successes: 0,
                opened_at: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Breaker> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether a request may be sent now. An open circuit past its cool-down turns
    /// half-open and lets the request through.
    pub fn can_execute(&self) -> bool {
        let mut breaker = self.lock();
        match breaker.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = breaker
                    .opened_at
                    .is_none_or(|at| at.elapsed() >= self.config.reset_timeout);
                if cooled {
                    debug!("Circuit half-open, allowing trial request");
                    breaker.state = CircuitState::HalfOpen;
                    breaker.trial_successes = 0;
                }
                cooled
            }
        }
    }

    /// Note a successful request
    pub fn record_success(&self) {
        let mut breaker = self.lock();
        breaker.failures = 0;
        if breaker.state == CircuitState::HalfOpen {
            breaker.trial_successes += 1;
            if breaker.trial_successes >= self.config.success_threshold {
                debug!("Circuit closed");
                breaker.state = CircuitState::Closed;
                breaker.opened_at = None;
            }
        }
    }

    /// Note a failed request
    pub fn record_failure(&self) {
        let mut breaker = self.lock();
        breaker.failures += 1;

        let open = match breaker.state {
            CircuitState::Closed => breaker.failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if open {
            warn!(failures = breaker.failures, "Circuit opened");
            breaker.state = CircuitState::Open;
            breaker.opened_at = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(failure_threshold: u32, reset_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold,
            success_threshold: 2,
            reset_timeout,
        })
    }

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            jitter: false,
            ..RetryConfig::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_capped_before_jitter() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 10.0,
            ..RetryConfig::default()
        };

        for _ in 0..20 {
            let delay = config.delay_for_attempt(4);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_no_retry() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(2, Duration::from_secs(30));
        assert!(cb.can_execute());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.can_execute());
    }

    #[test]
    fn test_success_resets_failure_run() {
        let cb = breaker(2, Duration::from_secs(30));
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_trial_requests_close_circuit() {
        let cb = breaker(1, Duration::ZERO);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        assert!(cb.can_execute());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_failed_trial_reopens() {
        let cb = breaker(1, Duration::ZERO);
        cb.record_failure();
        assert!(cb.can_execute());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_cool_down_is_respected() {
        let cb = breaker(1, Duration::from_millis(20));
        cb.record_failure();
        assert!(!cb.can_execute());

        std::thread::sleep(Duration::from_millis(30));
        assert!(cb.can_execute());
    }
}
