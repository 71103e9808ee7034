//! Core utilities for Recall Radar
//!
//! This crate provides functionality shared by the search client, the web
//! server and the command-line tool:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Retry & circuit breaking**: backoff policy for the hosted search index
//! - **Rate limiting**: token buckets per index
//! - **Caching**: in-memory TTL cache for search responses
//!
//! # Example
//!
//! ```rust,no_run
//! use recall_radar_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("binding to {}", config.schema.server.bind);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, ResponseCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
}
