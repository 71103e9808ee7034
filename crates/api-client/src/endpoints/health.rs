//! Health check of the search index

use crate::client::AlgoliaClient;
use crate::error::ApiResult;
use recall_radar_core::retry::CircuitState;
use recall_radar_search::{SearchRequest, SearchResponse};
use serde::Serialize;
use std::time::{Duration, Instant};

/// A probe slower than this marks the index as degraded
const SLOW_PROBE: Duration = Duration::from_secs(1);

/// Health check API interface
#[derive(Clone)]
pub struct HealthApi {
    client: AlgoliaClient,
}

impl HealthApi {
    /// Create a new health API interface
    pub(crate) fn new(client: AlgoliaClient) -> Self {
        Self { client }
    }

    /// Send a zero-hit query straight to the index and time it
    pub async fn probe(&self) -> ApiResult<(SearchResponse, Duration)> {
        let start = Instant::now();
        let response = self.client.query_uncached(&SearchRequest::probe()).await?;
        Ok((response, start.elapsed()))
    }

    /// Check index health; failures are reported, not returned
    pub async fn check(&self) -> HealthReport {
        let index = self.client.index_name().to_string();

        match self.probe().await {
            Ok((response, latency)) => HealthReport {
                status: if latency > SLOW_PROBE {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                },
                index,
                latency_ms: Some(duration_ms(latency)),
                total_records: Some(response.nb_hits),
                circuit: self.client.circuit_state(),
                error: None,
            },
            Err(e) => HealthReport {
                status: HealthStatus::Unavailable,
                index,
                latency_ms: None,
                total_records: None,
                circuit: self.client.circuit_state(),
                error: Some(e.to_string()),
            },
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Overall index health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Probe answered quickly
    Healthy,
    /// Probe answered, but slowly
    Degraded,
    /// Probe failed
    Unavailable,
}

impl HealthStatus {
    /// Whether searches can be served
    #[must_use]
    pub fn is_available(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Result of a health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,
    /// Index that was probed
    pub index: String,
    /// Probe round-trip time
    pub latency_ms: Option<u64>,
    /// Records in the index
    pub total_records: Option<u64>,
    /// Circuit breaker state after the probe
    pub circuit: CircuitState,
    /// Failure description
    pub error: Option<String>,
}
