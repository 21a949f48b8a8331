//! Failures of the map service client

use std::error::Error as StdError;
use thiserror::Error;

/// Result of a service call
pub type ApiResult<T> = Result<T, ApiError>;

/// Why a service call failed
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never got an answer
    #[error("Request to map service failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The answer was not the JSON we expected
    #[error("Malformed JSON from map service: {0}")]
    Json(#[from] serde_json::Error),

    /// The client configuration is unusable
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// The service answered with a non-success status
    #[error("Map service answered {status}: {message}")]
    ApiResponse {
        /// HTTP status
        status: u16,
        /// Body of the answer
        message: String,
    },

    /// The service answered 200 with a payload we cannot use
    #[error("Unusable answer from map service: {0}")]
    UnexpectedResponse(String),

    /// Too many recent failures, the service is given a rest
    #[error("Map service is failing, requests paused for a while")]
    CircuitOpen,

    /// A single attempt ran past its deadline
    #[error("No answer within {0:?}")]
    Timeout(std::time::Duration),

    /// Every attempt failed
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last_error: String,
    },

    /// The endpoint is not an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// [`ApiError::Config`] from text
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// [`ApiError::ApiResponse`] from a status and body
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// [`ApiError::UnexpectedResponse`] from text
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Whether sending the same request again may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            // Overpass answers 429 and 504 when busy
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::CircuitOpen
            | Self::Config(_)
            | Self::Json(_)
            | Self::UnexpectedResponse(_)
            | Self::InvalidUrl(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// 4xx answer
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// 5xx answer
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// Short message suitable for showing to a rider.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Request(e) if e.is_timeout() => "Connection timed out - please try again",
            Self::Request(e) if is_tls_failure(e) => "Secure connection failed",
            Self::Request(e) if e.is_connect() => "No internet connection available",
            Self::Timeout(_) => "Connection timed out - please try again",
            Self::ApiResponse { status: 401, .. } => "Authentication required - please login again",
            Self::ApiResponse { status: 403, .. } => "Access denied - route may be private",
            Self::ApiResponse { status: 404, .. } => "Route not found",
            Self::ApiResponse { status: 429, .. } => "Too many requests - please wait and try again",
            _ => "Network error occurred",
        }
    }
}

/// Certificate and handshake problems surface only in the source chain
fn is_tls_failure(err: &reqwest::Error) -> bool {
    std::iter::successors(err.source(), |&cause| cause.source()).any(|cause| {
        let text = cause.to_string().to_lowercase();
        ["certificate", "tls", "ssl"].iter().any(|needle| text.contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retryable() {
        assert!(ApiError::api_response(504, "gateway").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(400, "bad query").is_retryable());
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!ApiError::CircuitOpen.is_retryable());
    }

    #[test]
    fn test_status_classes() {
        assert!(ApiError::api_response(404, "").is_client_error());
        assert!(!ApiError::api_response(404, "").is_server_error());
        assert!(ApiError::api_response(503, "").is_server_error());
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_a_tls_failure() {
        let err = reqwest::get("http://127.0.0.1:9/").await.unwrap_err();
        assert!(!is_tls_failure(&err));

        let api: ApiError = err.into();
        assert!(api.is_retryable());
        assert_eq!(api.user_message(), "No internet connection available");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ApiError::api_response(401, "").user_message(),
            "Authentication required - please login again"
        );
        assert_eq!(
            ApiError::api_response(403, "").user_message(),
            "Access denied - route may be private"
        );
        assert_eq!(ApiError::api_response(404, "").user_message(), "Route not found");
        assert_eq!(
            ApiError::api_response(429, "").user_message(),
            "Too many requests - please wait and try again"
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(3)).user_message(),
            "Connection timed out - please try again"
        );
        assert_eq!(ApiError::api_response(500, "").user_message(), "Network error occurred");
        assert_eq!(ApiError::CircuitOpen.user_message(), "Network error occurred");
    }
}
