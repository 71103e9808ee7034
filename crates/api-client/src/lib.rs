//! HTTP client for the hosted product recall search index
//!
//! This crate provides a resilient client for the index that holds the
//! recall records, and plugs it into the search crate as a
//! [`SearchBackend`](recall_radar_search::SearchBackend).
//!
//! # Features
//!
//! - **Environment-based configuration**: credentials and index name from environment variables
//! - **Response cache**: repeated queries are served from memory
//! - **Retry with exponential backoff**: automatic retry for transient failures
//! - **Circuit breaker**: stop calling the index during outages
//! - **Rate limiting**: keep keystroke bursts within the search quota
//! - **Request correlation**: every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use recall_radar_client::AlgoliaClient;
//! use recall_radar_search::{SearchSession, ClassificationState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fails fast if ALGOLIA_APP_ID or ALGOLIA_SEARCH_ONLY_API_KEY is unset
//!     let client = AlgoliaClient::new()?;
//!
//!     let report = client.health().check().await;
//!     println!("Index status: {:?}", report.status);
//!
//!     let session = SearchSession::new(client);
//!     if let Some(outcome) = session.search("ToyWorld Teddy").await? {
//!         println!("{}", outcome.state);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod backend;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::AlgoliaClient;
pub use config::{ClientConfig, DEFAULT_INDEX_NAME, Environment};
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::AlgoliaClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{HealthApi, HealthReport, HealthStatus};
    pub use crate::error::{ApiError, ApiResult};
}
