//! [`SearchBackend`] implementation for the hosted index

use crate::client::AlgoliaClient;
use async_trait::async_trait;
use recall_radar_search::{SearchBackend, SearchRequest, SearchResponse};

#[async_trait]
impl SearchBackend for AlgoliaClient {
    async fn search(&self, request: &SearchRequest) -> recall_radar_search::Result<SearchResponse> {
        Ok(self.query(request).await?)
    }

    async fn probe(&self) -> recall_radar_search::Result<SearchResponse> {
        Ok(self.query_uncached(&SearchRequest::probe()).await?)
    }

    fn name(&self) -> &str {
        "algolia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use recall_radar_core::retry::RetryConfig;
    use recall_radar_search::{ClassificationState, SearchError, SearchSession};

    #[tokio::test]
    async fn test_session_over_http_classifies_fuzzy_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(200)
            .with_body(
                r#"{"hits": [{"objectID": "1", "product_name": "SafeSeat Junior", "_rankingInfo": {"nbTypos": 1}}], "nbHits": 1}"#,
            )
            .create_async()
            .await;

        let client =
            AlgoliaClient::with_config(ClientConfig::new("APP", "key").with_host(server.url()))
                .unwrap();
        let session = SearchSession::new(client);
        let outcome = session.search("SafeSet").await.unwrap().unwrap();

        assert_eq!(outcome.state, ClassificationState::Orange);
        assert_eq!(session.backend().name(), "algolia");
    }

    #[tokio::test]
    async fn test_unreachable_index_settles_idle() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(500)
            .create_async()
            .await;

        let config = ClientConfig::new("APP", "key")
            .with_host(server.url())
            .with_retry(RetryConfig::no_retry());
        let session = SearchSession::new(AlgoliaClient::with_config(config).unwrap());

        let err = session.search("teddy").await.unwrap_err();
        assert!(matches!(err, SearchError::Backend(_)));
        assert_eq!(session.sequencer().current_state(), ClassificationState::Idle);
    }

    #[tokio::test]
    async fn test_health_check_skips_the_response_cache() {
        let mut server = mockito::Server::new_async().await;
        let up = server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(200)
            .with_body(r#"{"hits": [], "nbHits": 42}"#)
            .create_async()
            .await;

        let config = ClientConfig::new("APP", "key")
            .with_host(server.url())
            .with_retry(RetryConfig::no_retry());
        let client = AlgoliaClient::with_config(config).unwrap();

        assert_eq!(SearchBackend::probe(&client).await.unwrap().nb_hits, 42);
        // Prime the cache with the same request
        client.search(&SearchRequest::probe()).await.unwrap();

        up.remove_async().await;
        server
            .mock("POST", "/1/indexes/product_recalls/query")
            .with_status(500)
            .create_async()
            .await;

        assert!(client.search(&SearchRequest::probe()).await.unwrap().cached);
        assert!(SearchBackend::probe(&client).await.is_err());
    }

    #[test]
    fn test_blank_query_never_reaches_the_index() {
        // Nothing listens here; a request would fail
        let config = ClientConfig::new("APP", "key")
            .with_host("http://127.0.0.1:9")
            .with_retry(RetryConfig::no_retry());
        let session = SearchSession::new(AlgoliaClient::with_config(config).unwrap());

        let outcome = tokio_test::block_on(session.search("   ")).unwrap().unwrap();
        assert_eq!(outcome.state, ClassificationState::Idle);
        assert!(outcome.hits.is_empty());
    }

    /// Needs real credentials in the environment
    #[cfg(feature = "integration")]
    #[tokio::test]
    async fn test_live_index_answers() {
        let session = SearchSession::new(AlgoliaClient::new().unwrap());
        let outcome = session.search("teddy").await.unwrap().unwrap();
        assert_ne!(outcome.state, ClassificationState::Idle);
    }
}
