//! The search backend seam.
//!
//! Matching and ranking happen in the hosted index. Everything in this
//! workspace reaches it through [`SearchBackend`], so tests and offline runs
//! can swap in [`StubBackend`].

use crate::error::{Result, SearchError};
use crate::record::RecallRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hits requested per query unless configured otherwise.
pub const DEFAULT_HITS_PER_PAGE: u32 = 10;

/// A query sent to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(rename = "hitsPerPage")]
    pub hits_per_page: u32,
    #[serde(rename = "getRankingInfo")]
    pub get_ranking_info: bool,
}

impl SearchRequest {
    /// A request with the default page size and ranking info enabled.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            get_ranking_info: true,
        }
    }

    /// The empty, zero-hit query used for health checks.
    pub fn probe() -> Self {
        Self::new("").with_hits_per_page(0)
    }

    /// Set the page size.
    #[must_use]
    pub fn with_hits_per_page(mut self, hits_per_page: u32) -> Self {
        self.hits_per_page = hits_per_page;
        self
    }
}

/// One page of results from the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<RecallRecord>,
    /// Total matches in the index, not just this page
    #[serde(rename = "nbHits", default)]
    pub nb_hits: u64,
    #[serde(rename = "processingTimeMS", default)]
    pub processing_time_ms: u64,
    /// Query as echoed by the index
    #[serde(default)]
    pub query: String,
    /// Served from a local response cache rather than the index
    #[serde(skip)]
    pub cached: bool,
}

impl SearchResponse {
    /// Build a response from a list of hits.
    pub fn from_hits(query: impl Into<String>, hits: Vec<RecallRecord>) -> Self {
        Self {
            nb_hits: hits.len() as u64,
            hits,
            processing_time_ms: 0,
            query: query.into(),
            cached: false,
        }
    }
}

/// Anything that can answer a search query with scored recall records.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Send a zero-hit query that must reach the backend itself.
    ///
    /// Backends that cache responses override this to skip the cache.
    async fn probe(&self) -> Result<SearchResponse> {
        self.search(&SearchRequest::probe()).await
    }

    /// Short name for logs.
    fn name(&self) -> &str {
        "search"
    }
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        (**self).search(request).await
    }

    async fn probe(&self) -> Result<SearchResponse> {
        (**self).probe().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Canned responses keyed by exact query text, as stored in a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubFixture {
    #[serde(default)]
    pub responses: HashMap<String, Vec<RecallRecord>>,
    /// Hits for any query not listed in `responses`
    #[serde(default)]
    pub default: Vec<RecallRecord>,
}

/// In-memory backend returning canned scored results.
#[derive(Debug, Default)]
pub struct StubBackend {
    fixture: StubFixture,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl StubBackend {
    /// An empty stub: every query returns no hits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed fixture.
    pub fn from_fixture(fixture: StubFixture) -> Self {
        Self {
            fixture,
            ..Self::default()
        }
    }

    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: StubFixture = serde_json::from_str(json)
            .map_err(|e| SearchError::InvalidFixture(e.to_string()))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Register hits for an exact query.
    #[must_use]
    pub fn with_response(mut self, query: impl Into<String>, hits: Vec<RecallRecord>) -> Self {
        self.fixture.responses.insert(query.into(), hits);
        self
    }

    /// Make every following call fail, or succeed again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, request: &SearchRequest) -> SearchResponse {
        let hits = self
            .fixture
            .responses
            .get(&request.query)
            .unwrap_or(&self.fixture.default);
        let page_size = usize::try_from(request.hits_per_page).unwrap_or(usize::MAX);

        SearchResponse {
            nb_hits: hits.len() as u64,
            hits: hits.iter().take(page_size).cloned().collect(),
            processing_time_ms: 0,
            query: request.query.clone(),
            cached: false,
        }
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SearchError::Backend("stub backend set to fail".to_string()));
        }
        Ok(self.lookup(request))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_to_index_params() {
        let request = SearchRequest::new("teddy");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "teddy", "hitsPerPage": 10, "getRankingInfo": true})
        );
    }

    #[test]
    fn test_response_deserialize() {
        let json = r#"{
            "hits": [{"objectID": "1", "product_name": "Teddy", "_rankingInfo": {"nbTypos": 1}}],
            "nbHits": 42,
            "page": 0,
            "nbPages": 5,
            "hitsPerPage": 10,
            "processingTimeMS": 3,
            "query": "tedy"
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.nb_hits, 42);
        assert_eq!(response.processing_time_ms, 3);
        assert_eq!(response.hits[0].typo_count(), Some(1));
    }

    #[tokio::test]
    async fn test_stub_returns_canned_hits() {
        let stub = StubBackend::new()
            .with_response("teddy", vec![RecallRecord::new("1", "Teddy").with_typos(0)]);

        let response = stub.search(&SearchRequest::new("teddy")).await.unwrap();
        assert_eq!(response.hits.len(), 1);

        let response = stub.search(&SearchRequest::new("other")).await.unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_stub_respects_page_size() {
        let hits = (0..15).map(|i| RecallRecord::new(i.to_string(), "Seat")).collect();
        let stub = StubBackend::new().with_response("seat", hits);

        let response = stub.search(&SearchRequest::new("seat")).await.unwrap();
        assert_eq!(response.hits.len(), 10);
        assert_eq!(response.nb_hits, 15);
    }

    #[tokio::test]
    async fn test_stub_failure_toggle() {
        let stub = Arc::new(StubBackend::new());
        stub.set_failing(true);
        assert!(stub.search(&SearchRequest::new("x")).await.is_err());

        stub.set_failing(false);
        assert!(stub.search(&SearchRequest::new("x")).await.is_ok());
        assert_eq!(stub.name(), "stub");
    }

    #[tokio::test]
    async fn test_default_health_check_asks_for_no_hits() {
        let hits = (0..3).map(|i| RecallRecord::new(i.to_string(), "Seat")).collect();
        let stub = Arc::new(StubBackend::new().with_response("", hits));

        let response = stub.probe().await.unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(response.nb_hits, 3);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_fixture_parsing() {
        let stub = StubBackend::from_json(
            r#"{"responses": {"ToyWorld Teddy": [{"objectID": "1", "_rankingInfo": {"nbTypos": 0}}]}}"#,
        )
        .unwrap();
        assert_eq!(stub.fixture.responses.len(), 1);
        assert!(stub.fixture.default.is_empty());

        assert!(StubBackend::from_json("not json").is_err());
    }
}
