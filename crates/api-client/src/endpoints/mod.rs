//! Endpoint-specific API implementations
//!
//! | Module | Index operation | Description |
//! |--------|-----------------|-------------|
//! | `health` | `POST /1/indexes/{index}/query` with zero hits | Reachability and latency probe |
//!
//! Regular queries go through [`AlgoliaClient::query`](crate::AlgoliaClient::query).

pub mod health;

pub use health::{HealthApi, HealthReport, HealthStatus};
