//! Error handling with codes, context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Error codes for programmatic handling
//! - Detailed error context
//! - Recovery suggestions

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,
    Timeout = 1003,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,
    MissingCredentials = 3004,

    // Search errors (4xxx)
    SearchError = 4000,
    SearchUnavailable = 4001,
    MalformedResponse = 4002,

    // Network errors (5xxx)
    NetworkError = 5000,
    RateLimited = 5001,
    CircuitOpen = 5002,

    // Validation errors (6xxx)
    ValidationError = 6000,
    InvalidInput = 6001,
    QueryTooLong = 6002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Search",
            5 => "Network",
            6 => "Validation",
            _ => "Unknown",
        }
    }

    /// Process exit code for this error's category
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            4 | 5 => exit_codes::SEARCH_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            _ if *self == ErrorCode::Timeout => exit_codes::TIMEOUT,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .recall-radar.toml file or use --config to specify a path")
    }

    pub fn missing_credentials(var: &str) -> Self {
        Self::new(
            ErrorCode::MissingCredentials,
            format!("Missing search credentials: {var} is not set"),
        )
        .with_suggestion(format!(
            "Export {var} with the search-only key/application id of your index"
        ))
    }

    pub fn search(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SearchError, message)
    }

    pub fn search_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SearchUnavailable, message)
            .with_suggestion("Check network connectivity and the search service status")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn query_too_long(len: usize, max: usize) -> Self {
        Self::new(
            ErrorCode::QueryTooLong,
            format!("Query is {len} characters long, the limit is {max}"),
        )
        .with_suggestion("Search for the brand or model name only")
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const SEARCH_ERROR: i32 = 4;
    pub const TIMEOUT: i32 = 124;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::MalformedResponse, format!("JSON parse error: {err}"))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::SearchUnavailable.to_string(), "E4001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::MissingCredentials.category(), "Configuration");
        assert_eq!(ErrorCode::RateLimited.category(), "Network");
        assert_eq!(ErrorCode::QueryTooLong.category(), "Validation");
    }

    #[test]
    fn test_exit_codes_follow_category() {
        assert_eq!(ErrorCode::MissingCredentials.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::CircuitOpen.exit_code(), exit_codes::SEARCH_ERROR);
        assert_eq!(ErrorCode::Timeout.exit_code(), exit_codes::TIMEOUT);
        assert_eq!(ErrorCode::Internal.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_context_is_displayed() {
        let err = Error::config("bad bind address").with_context("reading [server]");
        let text = err.to_string();
        assert!(text.starts_with("[E3000] bad bind address"));
        assert!(text.contains("Context: reading [server]"));
    }

    #[test]
    fn test_missing_credentials_names_variable() {
        let err = Error::missing_credentials("ALGOLIA_APP_ID");
        assert_eq!(err.code, ErrorCode::MissingCredentials);
        assert!(err.message.contains("ALGOLIA_APP_ID"));
        assert!(err.suggestion.unwrap().contains("ALGOLIA_APP_ID"));
    }
}
