//! Configuration for the search client
//!
//! Credentials come from the environment. The application id and the
//! search-only API key are required: a client is never built with empty
//! credentials.

use crate::error::{ApiError, ApiResult};
use recall_radar_core::cache::CacheConfig;
use recall_radar_core::rate_limit::RateLimitConfig;
use recall_radar_core::retry::RetryConfig;
use serde::{Serialize, Serializer};
use std::env;
use std::time::Duration;

/// Index queried when none is configured
pub const DEFAULT_INDEX_NAME: &str = "product_recalls";

/// Application id variable, with its legacy public fallback
pub const APP_ID_VARS: [&str; 2] = ["ALGOLIA_APP_ID", "NEXT_PUBLIC_ALGOLIA_APP_ID"];

/// Search-only API key variable, with its legacy public fallback
pub const API_KEY_VARS: [&str; 2] = [
    "ALGOLIA_SEARCH_ONLY_API_KEY",
    "NEXT_PUBLIC_ALGOLIA_SEARCH_ONLY_API_KEY",
];

/// Index name variable, with its legacy public fallback
pub const INDEX_NAME_VARS: [&str; 2] = ["ALGOLIA_INDEX_NAME", "NEXT_PUBLIC_ALGOLIA_INDEX_NAME"];

const HOST_VAR: &str = "ALGOLIA_HOST";
const ENV_VAR: &str = "RECALL_RADAR_ENV";
const TIMEOUT_VAR: &str = "RECALL_RADAR_TIMEOUT_SECS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse an environment name; anything unrecognised is production
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Retry preset for this environment
    pub fn retry(self) -> RetryConfig {
        match self {
            Self::Development => RetryConfig::quick(),
            Self::Staging => RetryConfig::default(),
            Self::Production => RetryConfig::patient(),
        }
    }

    /// Rate-limit preset for this environment
    pub fn rate_limit(self) -> RateLimitConfig {
        match self {
            Self::Development => RateLimitConfig::per_second(100),
            Self::Staging => RateLimitConfig::per_second(50),
            Self::Production => RateLimitConfig::per_second(30),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    /// Application id of the hosted index
    pub app_id: String,
    /// Search-only API key
    #[serde(serialize_with = "redact")]
    pub api_key: String,
    /// Index holding the recall records
    pub index_name: String,
    /// Override for the search host (defaults to the application's DSN host)
    pub host: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limit configuration
    pub rate_limit: RateLimitConfig,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Current environment
    pub environment: Environment,
}

fn redact<S: Serializer>(key: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&redacted(key))
}

/// Show only the last four characters of a secret
pub fn redacted(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

impl ClientConfig {
    /// Configuration for explicit credentials, with production presets
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        let environment = Environment::default();
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            host: None,
            timeout: DEFAULT_TIMEOUT,
            retry: environment.retry(),
            rate_limit: environment.rate_limit(),
            cache: CacheConfig::default(),
            environment,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `ALGOLIA_APP_ID` (or `NEXT_PUBLIC_ALGOLIA_APP_ID`): required
    /// - `ALGOLIA_SEARCH_ONLY_API_KEY` (or `NEXT_PUBLIC_ALGOLIA_SEARCH_ONLY_API_KEY`): required
    /// - `ALGOLIA_INDEX_NAME` (or `NEXT_PUBLIC_ALGOLIA_INDEX_NAME`): defaults to `product_recalls`
    /// - `ALGOLIA_HOST`: optional host override
    /// - `RECALL_RADAR_ENV`: development/staging/production
    /// - `RECALL_RADAR_TIMEOUT_SECS`: request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let app_id = first(&APP_ID_VARS).ok_or_else(|| ApiError::missing_env(APP_ID_VARS[0]))?;
        let api_key = first(&API_KEY_VARS).ok_or_else(|| ApiError::missing_env(API_KEY_VARS[0]))?;
        let index_name =
            first(&INDEX_NAME_VARS).unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        let host = first(&[HOST_VAR]);

        let environment = first(&[ENV_VAR])
            .map(|value| Environment::parse(&value))
            .unwrap_or_default();

        let timeout = first(&[TIMEOUT_VAR])
            .and_then(|s| s.parse().ok())
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Ok(Self {
            app_id,
            api_key,
            index_name,
            host,
            timeout,
            retry: environment.retry(),
            rate_limit: environment.rate_limit(),
            cache: CacheConfig::default(),
            environment,
        })
    }

    /// Base URL of the search host
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", self.app_id.to_lowercase()),
        }
    }

    /// Builder-style method to set the index name
    #[must_use]
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Builder-style method to override the search host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
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

    /// Builder-style method to set the response cache
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Builder-style method to switch environment presets
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self.retry = environment.retry();
        self.rate_limit = environment.rate_limit();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.app_id.trim().is_empty() {
            return Err(ApiError::missing_env(APP_ID_VARS[0]));
        }

        if self.api_key.trim().is_empty() {
            return Err(ApiError::missing_env(API_KEY_VARS[0]));
        }

        if self.index_name.trim().is_empty() {
            return Err(ApiError::config("index_name cannot be empty"));
        }

        if let Some(host) = &self.host {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                return Err(ApiError::config("host must start with http:// or https://"));
            }
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_primary_vars() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ALGOLIA_APP_ID", "APP123"),
            ("ALGOLIA_SEARCH_ONLY_API_KEY", "search-key"),
            ("ALGOLIA_INDEX_NAME", "recalls_staging"),
            ("RECALL_RADAR_ENV", "staging"),
            ("RECALL_RADAR_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.app_id, "APP123");
        assert_eq!(config.index_name, "recalls_staging");
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.base_url(), "https://app123-dsn.algolia.net");
    }

    #[test]
    fn test_from_lookup_public_fallbacks() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("NEXT_PUBLIC_ALGOLIA_APP_ID", "APP"),
            ("NEXT_PUBLIC_ALGOLIA_SEARCH_ONLY_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.app_id, "APP");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.index_name, DEFAULT_INDEX_NAME);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let err = ClientConfig::from_lookup(lookup(&[("ALGOLIA_SEARCH_ONLY_API_KEY", "key")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingEnvVar(ref var) if var == "ALGOLIA_APP_ID"));

        // Empty strings are not credentials
        let err = ClientConfig::from_lookup(lookup(&[
            ("ALGOLIA_APP_ID", "APP"),
            ("ALGOLIA_SEARCH_ONLY_API_KEY", "  "),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ApiError::MissingEnvVar(ref var) if var == "ALGOLIA_SEARCH_ONLY_API_KEY")
        );
    }

    #[test]
    fn test_host_override() {
        let config = ClientConfig::new("APP", "key").with_host("http://127.0.0.1:7700/");
        assert_eq!(config.base_url(), "http://127.0.0.1:7700");
        assert!(config.validate().is_ok());

        let config = ClientConfig::new("APP", "key").with_host("ftp://nope");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_presets() {
        assert_eq!(Environment::parse("DEV"), Environment::Development);
        assert_eq!(Environment::parse("stage"), Environment::Staging);
        assert_eq!(Environment::parse("anything"), Environment::Production);

        let config = ClientConfig::new("APP", "key").with_environment(Environment::Development);
        assert_eq!(config.retry.max_attempts, RetryConfig::quick().max_attempts);
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::new("APP", "key").validate().is_ok());
        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("APP", "key").with_index_name("").validate().is_err());
        assert!(
            ClientConfig::new("APP", "key")
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_api_key_redacted_when_serialized() {
        let config = ClientConfig::new("APP", "supersecretkey");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["api_key"], "**********tkey");
        assert_eq!(redacted("abc"), "***");
    }
}
