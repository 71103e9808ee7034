//! Error types for the search client

use recall_radar_core::{Error as CoreError, ErrorCode};
use recall_radar_search::SearchError;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Search client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Index returned an error response
    #[error("Search API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from the index
        message: String,
    },

    /// Circuit breaker is open
    #[error("Circuit breaker is open - search temporarily unavailable")]
    CircuitOpen,

    /// Rate limited
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::CircuitOpen | Self::RateLimited => false,
            Self::Config(_)
            | Self::MissingEnvVar(_)
            | Self::Json(_)
            | Self::InvalidUrl(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// Workspace error code for this failure
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::InvalidUrl(_) => ErrorCode::ConfigValidationError,
            Self::MissingEnvVar(_) => ErrorCode::MissingCredentials,
            Self::Json(_) => ErrorCode::MalformedResponse,
            Self::CircuitOpen => ErrorCode::CircuitOpen,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::Request(_) => ErrorCode::NetworkError,
            Self::ApiResponse { .. } | Self::RetriesExhausted { .. } => {
                ErrorCode::SearchUnavailable
            }
        }
    }
}

impl From<ApiError> for SearchError {
    fn from(err: ApiError) -> Self {
        SearchError::backend(err)
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::MissingEnvVar(var) => CoreError::missing_credentials(var),
            ApiError::RetriesExhausted { .. } | ApiError::ApiResponse { .. } => {
                CoreError::search_unavailable(err.to_string())
            }
            _ => CoreError::new(err.error_code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(503, "down").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(403, "invalid key").is_retryable());
        assert!(!ApiError::CircuitOpen.is_retryable());
        assert!(ApiError::Timeout(std::time::Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn test_status_classes() {
        assert!(ApiError::api_response(404, "no index").is_client_error());
        assert!(ApiError::api_response(502, "bad gateway").is_server_error());
        assert!(!ApiError::RateLimited.is_server_error());
    }

    #[test]
    fn test_missing_env_maps_to_credentials_code() {
        let err: CoreError = ApiError::missing_env("ALGOLIA_APP_ID").into();
        assert_eq!(err.code, ErrorCode::MissingCredentials);
        assert!(err.message.contains("ALGOLIA_APP_ID"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_into_search_error() {
        let err: SearchError = ApiError::CircuitOpen.into();
        assert!(matches!(err, SearchError::Backend(msg) if msg.contains("Circuit breaker")));
    }
}
