//! Configuration schema definitions
//!
//! Every section and field is optional in the TOML file; missing values fall
//! back to the defaults below.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the web server binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl ServerConfig {
    /// Parse the bind address
    pub fn bind_addr(&self) -> Option<SocketAddr> {
        self.bind.parse().ok()
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Search request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hits requested per query
    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: u32,

    /// Longest accepted query, in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// How long a search response stays cached (0 disables caching)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of cached responses
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hits_per_page: default_hits_per_page(),
            max_query_length: default_max_query_length(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_hits_per_page() -> u32 {
    10
}

fn default_max_query_length() -> usize {
    512
}

fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_cache_capacity() -> usize {
    512
}

/// Page presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Keystroke debounce applied by the page script
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Title shown in the header bar
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Recall databases named in the footer and disclaimer
    #[serde(default = "default_data_sources")]
    pub data_sources: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            site_title: default_site_title(),
            data_sources: default_data_sources(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_site_title() -> String {
    "Recall Radar".to_string()
}

fn default_data_sources() -> Vec<String> {
    vec!["RAPEX (EU)".to_string(), "DGCCRF (FR)".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,

    /// Directory for daily-rolling log files
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            log_dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
