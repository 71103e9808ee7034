//! CLI command implementations

pub mod check;
pub mod config;
pub mod health;
pub mod serve;

use anyhow::Result;
use recall_radar_client::{AlgoliaClient, ClientConfig};
use recall_radar_core::cache::CacheConfig;
use recall_radar_core::config::Config;
use recall_radar_core::Error;
use recall_radar_search::{SearchBackend, SearchError, StubBackend};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Client for the hosted index, configured from the environment
pub fn algolia_client(config: &Config) -> Result<AlgoliaClient> {
    let search = &config.schema.search;
    let client_config = ClientConfig::from_env()
        .map_err(Error::from)?
        .with_cache(CacheConfig::new(
            Duration::from_secs(search.cache_ttl_secs),
            search.cache_capacity,
        ));

    let client = AlgoliaClient::with_config(client_config).map_err(Error::from)?;
    tracing::debug!(
        index = client.index_name(),
        url = %client.query_url(),
        "Search client ready"
    );
    Ok(client)
}

/// The hosted index, or canned responses from a fixture file
pub fn backend(config: &Config, offline: Option<&Path>) -> Result<Arc<dyn SearchBackend>> {
    match offline {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                Error::from(e).with_context(format!("reading fixture {}", path.display()))
            })?;
            let stub = StubBackend::from_json(&json).map_err(search_error)?;
            tracing::info!(fixture = %path.display(), "Answering from fixture");
            Ok(Arc::new(stub))
        }
        None => Ok(Arc::new(algolia_client(config)?)),
    }
}

/// Map a search failure to a coded error
pub fn search_error(err: SearchError) -> Error {
    match err {
        SearchError::InvalidQuery(message) => Error::validation(message),
        SearchError::InvalidFixture(message) => Error::config(message),
        SearchError::Backend(message) => Error::search_unavailable(message),
    }
}
