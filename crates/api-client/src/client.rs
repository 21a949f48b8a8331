//! Shared HTTP client for Overpass, elevation, weather and OSRM

use crate::config::ClientConfig;
use crate::endpoints::{ElevationApi, OsrmApi, OverpassApi, WeatherApi};
use crate::error::{ApiError, ApiResult};
use grvlfinder_core::rate_limit::RateLimiter;
use grvlfinder_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Correlation header sent with every request
const X_REQUEST_ID: &str = "X-Request-ID";

/// Shortest sleep while a host's bucket refills
const MIN_THROTTLE_WAIT: Duration = Duration::from_millis(10);

/// Bucket used for URLs without a host
const FALLBACK_HOST: &str = "default";

#[derive(Clone, Copy)]
enum Payload<'a> {
    Query(&'a [(&'a str, String)]),
    Form(&'a [(&'a str, String)]),
}

/// One logical request, possibly sent several times
struct Call<'a> {
    id: String,
    method: Method,
    url: &'a str,
    payload: Payload<'a>,
}

impl Call<'_> {
    fn build(&self, http: &Client) -> RequestBuilder {
        let request = http
            .request(self.method.clone(), self.url)
            .header(X_REQUEST_ID, self.id.as_str());
        match self.payload {
            Payload::Query([]) => request,
            Payload::Query(pairs) => request.query(pairs),
            Payload::Form(pairs) => request.form(pairs),
        }
    }
}

/// Client for the public map services.
///
/// Cloning is cheap and clones share one circuit breaker and one set of per-host
/// rate limit buckets. Requests wait for a rate limit token, are refused while the
/// circuit is open, and retryable failures are repeated on the configured backoff.
#[derive(Clone)]
pub struct GrvlClient {
    http: Client,
    config: Arc<ClientConfig>,
    breaker: Arc<CircuitBreaker>,
    limiter: Arc<RateLimiter>,
}

impl GrvlClient {
    /// Client configured from `GRVLFINDER_*` environment variables
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or when the HTTP client cannot be built.
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Client for an explicit configuration
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or when the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        Ok(Self {
            http: build_http(&config)?,
            breaker: Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
            limiter: Arc::new(service_limits(&config)),
            config: Arc::new(config),
        })
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// State of the shared circuit breaker
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Road queries
    #[must_use]
    pub fn overpass(&self) -> OverpassApi {
        OverpassApi::new(self.clone())
    }

    /// Terrain heights
    #[must_use]
    pub fn elevation(&self) -> ElevationApi {
        ElevationApi::new(self.clone())
    }

    /// Hourly forecasts
    #[must_use]
    pub fn weather(&self) -> WeatherApi {
        WeatherApi::new(self.clone())
    }

    /// Road-network routes
    #[must_use]
    pub fn osrm(&self) -> OsrmApi {
        OsrmApi::new(self.clone())
    }

    /// GET `url` with `query` and decode the JSON answer
    ///
    /// # Errors
    ///
    /// Fails on an invalid URL, while the circuit is open, on a non-retryable error
    /// or once every attempt has failed.
    #[instrument(skip(self, query), fields(request_id))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.send(Method::GET, url, Payload::Query(query)).await
    }

    /// POST `form` to `url` and decode the JSON answer
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_json`].
    #[instrument(skip(self, form), fields(request_id))]
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> ApiResult<T> {
        self.send(Method::POST, url, Payload::Form(form)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        payload: Payload<'_>,
    ) -> ApiResult<T> {
        if let Err(e) = Url::parse(url) {
            return Err(ApiError::InvalidUrl(format!("{url}: {e}")));
        }

        let call = Call {
            id: Uuid::new_v4().to_string(),
            method,
            url,
            payload,
        };
        tracing::Span::current().record("request_id", call.id.as_str());

        if !self.breaker.can_execute() {
            warn!(request_id = %call.id, url, "Circuit open, request refused");
            return Err(ApiError::CircuitOpen);
        }

        self.throttle(&call).await;
        self.send_with_retries(&call).await
    }

    async fn throttle(&self, call: &Call<'_>) {
        let host = host_of(call.url);
        while let Err(wait) = self.limiter.acquire(&host) {
            let wait = wait.max(MIN_THROTTLE_WAIT);
            debug!(request_id = %call.id, host = %host, wait_ms = wait.as_millis(), "Throttled");
            tokio::time::sleep(wait).await;
        }
    }

    async fn send_with_retries<T: DeserializeOwned>(&self, call: &Call<'_>) -> ApiResult<T> {
        let retry = &self.config.retry;
        let mut last_error = None;

        for attempt in 0..retry.max_attempts {
            let delay = retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(request_id = %call.id, attempt, delay_ms = delay.as_millis(), "Backing off");
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            let error = match self.attempt(call).await {
                Ok(value) => {
                    self.breaker.record_success();
                    debug!(
                        request_id = %call.id,
                        attempt = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => e,
            };

            // Decoding failures and 4xx answers say nothing about service health
            if error.is_retryable() || error.is_server_error() {
                self.breaker.record_failure();
            }

            let last_attempt = attempt + 1 >= retry.max_attempts;
            debug!(request_id = %call.id, attempt = attempt + 1, error = %error, "Request failed");
            if last_attempt || !error.is_retryable() {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry.max_attempts,
            last_error: last_error.map_or_else(|| "no attempt was made".to_string(), |e| e.to_string()),
        })
    }

    async fn attempt<T: DeserializeOwned>(&self, call: &Call<'_>) -> ApiResult<T> {
        let exchange = async {
            let response = call.build(&self.http).send().await?;
            decode(response).await
        };

        match self.config.retry.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(ApiError::Timeout(limit))),
            None => exchange.await,
        }
    }
}

fn build_http(config: &ClientConfig) -> ApiResult<Client> {
    let agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|_| ApiError::config("user agent contains invalid characters"))?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, agent);

    Client::builder()
        .timeout(config.timeout)
        .default_headers(headers)
        .build()
        .map_err(ApiError::Request)
}

/// Default limit for every host, with the elevation service on its own stricter one
fn service_limits(config: &ClientConfig) -> RateLimiter {
    RateLimiter::new(config.rate_limit.clone())
        .with_limit(host_of(&config.elevation_url), config.elevation_rate_limit.clone())
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::api_response(status.as_u16(), message));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(ApiError::Json)
}

/// Host part of `url`, which names its rate limit bucket
fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grvlfinder_core::rate_limit::RateLimitConfig;
    use grvlfinder_core::retry::RetryConfig;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local(server: &MockServer) -> ClientConfig {
        ClientConfig::default()
            .with_overpass_url(format!("{}/api/interpreter", server.uri()))
            .with_retry(RetryConfig::no_retry())
    }

    fn quick_retries(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: false,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://api.opentopodata.org/v1/srtm30m?locations=1,2"),
            "api.opentopodata.org"
        );
        assert_eq!(host_of("http://127.0.0.1:8080/x"), "127.0.0.1");
        assert_eq!(host_of("not a url"), "default");
    }

    #[test]
    fn test_elevation_host_gets_its_own_limit() {
        let config = ClientConfig::default()
            .with_rate_limit(RateLimitConfig::per_second(10));
        let limiter = service_limits(&config);

        assert_eq!(
            limiter.config_for(&host_of(&config.elevation_url)),
            &config.elevation_rate_limit
        );
        assert_eq!(limiter.config_for("overpass-api.de"), &config.rate_limit);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(GrvlClient::with_config(ClientConfig::default()).is_ok());
        let bad = ClientConfig::default().with_overpass_url("");
        assert!(matches!(GrvlClient::with_config(bad), Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_json_sends_query_and_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("latitude", "50.88"))
            .and(header_exists("X-Request-ID"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hourly": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GrvlClient::with_config(local(&server)).unwrap();
        let value: Value = client
            .get_json(
                &format!("{}/forecast", server.uri()),
                &[("latitude", "50.88".to_string())],
            )
            .await
            .unwrap();
        assert!(value["hourly"].is_object());
    }

    #[tokio::test]
    async fn test_post_form_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(body_string_contains("data="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        let client = GrvlClient::with_config(local(&server)).unwrap();
        let value: Value = client
            .post_form_json(
                &format!("{}/api/interpreter", server.uri()),
                &[("data", "[out:json];".to_string())],
            )
            .await
            .unwrap();
        assert!(value["elements"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_busy_service_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(2)
            .mount(&server)
            .await;

        let client = GrvlClient::with_config(local(&server).with_retry(quick_retries(2))).unwrap();
        let result: ApiResult<Value> = client.get_json(&server.uri(), &[]).await;

        match result {
            Err(ApiError::ApiResponse { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = GrvlClient::with_config(local(&server).with_retry(quick_retries(3))).unwrap();
        let result: ApiResult<Value> = client.get_json(&server.uri(), &[]).await;
        assert!(result.unwrap_err().is_client_error());
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_repeated_failures_open_the_circuit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(504))
            .expect(5)
            .mount(&server)
            .await;

        let client = GrvlClient::with_config(local(&server)).unwrap();
        for _ in 0..5 {
            let _: ApiResult<Value> = client.get_json(&server.uri(), &[]).await;
        }
        assert_eq!(client.circuit_state(), CircuitState::Open);

        let refused: ApiResult<Value> = client.get_json(&server.uri(), &[]).await;
        assert!(matches!(refused, Err(ApiError::CircuitOpen)));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = GrvlClient::with_config(ClientConfig::default()).unwrap();
        let result: ApiResult<Value> = client.get_json("no-scheme", &[]).await;
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
