//! Main search client implementation

use crate::config::ClientConfig;
use crate::endpoints::HealthApi;
use crate::error::{ApiError, ApiResult};
use recall_radar_core::cache::{CacheStats, ResponseCache};
use recall_radar_core::rate_limit::RateLimiter;
use recall_radar_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use recall_radar_search::{SearchRequest, SearchResponse};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, Url};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Application id header
const APP_ID_HEADER: &str = "X-Algolia-Application-Id";

/// API key header
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

const CLIENT_USER_AGENT: &str = concat!("recall-radar/", env!("CARGO_PKG_VERSION"));

/// Search index client with built-in resilience patterns
///
/// This client wraps `reqwest` and adds:
/// - In-memory response cache
/// - Circuit breaker to stop calling an index that keeps failing
/// - Rate limiting per index
/// - Automatic retry with exponential backoff
/// - Request correlation IDs for tracing
#[derive(Clone)]
pub struct AlgoliaClient {
    inner: Client,
    config: Arc<ClientConfig>,
    query_url: Url,
    circuit_breaker: Arc<CircuitBreaker>,
    rate_limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache<SearchResponse>>,
}

impl AlgoliaClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        default_headers.insert(APP_ID_HEADER, header_value(&config.app_id, APP_ID_HEADER)?);

        let mut api_key = header_value(&config.api_key, API_KEY_HEADER)?;
        api_key.set_sensitive(true);
        default_headers.insert(API_KEY_HEADER, api_key);

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        let query_url = query_url(&config)?;
        let circuit_breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        let cache = Arc::new(ResponseCache::new(config.cache.clone()));

        Ok(Self {
            inner,
            config: Arc::new(config),
            query_url,
            circuit_breaker,
            rate_limiter,
            cache,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Name of the queried index
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    /// Full URL queries are posted to
    #[must_use]
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    /// Reset the rate limit for the configured index
    pub fn reset_rate_limit(&self) {
        self.rate_limiter.reset(&self.config.index_name);
    }

    /// Response cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Access health check endpoints
    #[must_use]
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    /// Run a query against the index with resilience patterns
    #[instrument(skip(self, request), fields(index = %self.config.index_name, query = %request.query))]
    pub async fn query(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        let page_size = request.hits_per_page.to_string();
        let cache_key = [
            self.config.index_name.as_str(),
            request.query.as_str(),
            page_size.as_str(),
        ];

        if let Some(mut cached) = self.cache.get(&cache_key) {
            debug!("Serving cached response");
            cached.cached = true;
            return Ok(cached);
        }

        let response = self.query_uncached(request).await?;
        self.cache.insert(&cache_key, response.clone());
        Ok(response)
    }

    /// Run a query, bypassing the response cache
    pub async fn query_uncached(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        let request_id = Uuid::new_v4().to_string();

        if !self.circuit_breaker.can_execute() {
            warn!(
                request_id = %request_id,
                index = %self.config.index_name,
                "Circuit breaker is open, rejecting request"
            );
            return Err(ApiError::CircuitOpen);
        }

        if !self.rate_limiter.try_acquire(&self.config.index_name) {
            warn!(
                request_id = %request_id,
                index = %self.config.index_name,
                "Rate limited"
            );
            return Err(ApiError::RateLimited);
        }

        self.execute_with_retry(&request_id, request).await
    }

    /// Execute request with retry logic
    async fn execute_with_retry(
        &self,
        request_id: &str,
        request: &SearchRequest,
    ) -> ApiResult<SearchResponse> {
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(request_id, request).await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    self.circuit_breaker.record_success();
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        hits = value.hits.len(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();

                    if e.is_retryable() && attempt + 1 < retry_config.max_attempts {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, will retry"
                        );
                        last_error = Some(e);
                    } else {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, not retrying"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request(
        &self,
        request_id: &str,
        request: &SearchRequest,
    ) -> ApiResult<SearchResponse> {
        let response = self
            .inner
            .post(self.query_url.clone())
            .header(X_REQUEST_ID, request_id)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.config.timeout)
                } else {
                    ApiError::Request(e)
                }
            })?;

        self.handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    async fn handle_response(&self, response: Response) -> ApiResult<SearchResponse> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), error_message(&message)))
        }
    }
}

/// Pull `message` out of a JSON error body, or keep the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn header_value(value: &str, name: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::config(format!("{name} contains invalid header characters")))
}

/// `{base}/1/indexes/{index}/query`, with the index name percent-encoded
fn query_url(config: &ClientConfig) -> ApiResult<Url> {
    let base = config.base_url();
    let mut url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(base.clone()))?
        .pop_if_empty()
        .extend(["1", "indexes", config.index_name.as_str(), "query"]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_radar_core::cache::CacheConfig;
    use recall_radar_core::retry::RetryConfig;
    use std::time::Duration;

    fn client_for(server: &mockito::Server) -> AlgoliaClient {
        let config = ClientConfig::new("TESTAPP", "search-key")
            .with_host(server.url())
            .with_retry(RetryConfig {
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                ..RetryConfig::default()
            });
        AlgoliaClient::with_config(config).unwrap()
    }

    const RED_BODY: &str = r#"{
        "hits": [{
            "objectID": "rapex-1",
            "product_name": "Teddy Bear",
            "brand": "ToyWorld",
            "risk_level": "Serious",
            "description": "Eyes can detach; choking hazard.",
            "_rankingInfo": {"nbTypos": 0}
        }],
        "nbHits": 1,
        "processingTimeMS": 2,
        "query": "ToyWorld Teddy"
    }"#;

    #[test]
    fn test_query_url() {
        let config = ClientConfig::new("MyApp", "key");
        assert_eq!(
            query_url(&config).unwrap().as_str(),
            "https://myapp-dsn.algolia.net/1/indexes/product_recalls/query"
        );

        let config = ClientConfig::new("APP", "key")
            .with_host("http://localhost:9000/")
            .with_index_name("recalls fr");
        assert_eq!(
            query_url(&config).unwrap().as_str(),
            "http://localhost:9000/1/indexes/recalls%20fr/query"
        );
    }

    #[test]
    fn test_client_creation_rejects_bad_header() {
        let config = ClientConfig::new("APP", "bad\nkey");
        assert!(AlgoliaClient::with_config(config).is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Invalid API key","status":403}"#), "Invalid API key");
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_query_sends_credentials_and_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .match_header("x-algolia-application-id", "TESTAPP")
            .match_header("x-algolia-api-key", "search-key")
            .match_header("x-request-id", mockito::Matcher::Any)
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "query": "ToyWorld Teddy",
                "hitsPerPage": 10,
                "getRankingInfo": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RED_BODY)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client.query(&SearchRequest::new("ToyWorld Teddy")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.hits.len(), 1);
        assert!(response.hits[0].is_exact_match());
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(200)
            .with_body(RED_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let request = SearchRequest::new("ToyWorld Teddy");
        assert!(!client.query(&request).await.unwrap().cached);
        assert!(client.query(&request).await.unwrap().cached);

        mock.assert_async().await;
        assert_eq!(client.cache_stats().entries, 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(200)
            .with_body(RED_BODY)
            .expect(2)
            .create_async()
            .await;

        let config = ClientConfig::new("APP", "key")
            .with_host(server.url())
            .with_cache(CacheConfig::disabled());
        let client = AlgoliaClient::with_config(config).unwrap();
        let request = SearchRequest::new("ToyWorld Teddy");
        client.query(&request).await.unwrap();
        client.query(&request).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(503)
            .with_body(r#"{"message":"Service unavailable"}"#)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.query(&SearchRequest::new("teddy")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ApiError::ApiResponse { status: 503, .. }));
        assert_eq!(client.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(403)
            .with_body(r#"{"message":"Invalid Application-ID or API key","status":403}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.query(&SearchRequest::new("teddy")).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Invalid Application-ID"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.query(&SearchRequest::new("teddy")).await.unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
    }

    #[tokio::test]
    async fn test_circuit_opens_after_repeated_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server);
        // Two failing queries of three attempts each cross the default threshold of five
        for query in ["a", "b"] {
            let _ = client.query(&SearchRequest::new(query)).await;
        }

        assert_eq!(client.circuit_state(), CircuitState::Open);
        let err = client.query(&SearchRequest::new("c")).await.unwrap_err();
        assert!(matches!(err, ApiError::CircuitOpen));

        client.reset_circuit();
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }
}
