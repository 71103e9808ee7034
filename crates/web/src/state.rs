//! Shared server state

use crate::error::Result;
use crate::page::PageRenderer;
use recall_radar_core::config::ConfigSchema;
use recall_radar_search::{RequestSequencer, SearchBackend};
use recall_radar_telemetry::MetricsRegistry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Open browser tabs tracked at once
const MAX_TABS: usize = 1024;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub config: Arc<ConfigSchema>,
    pub metrics: Arc<MetricsRegistry>,
    pub page: Arc<PageRenderer>,
    pub tabs: Arc<TabSequencers>,
}

impl AppState {
    /// Build state around a backend; fails if the page template is invalid
    pub fn new(backend: Arc<dyn SearchBackend>, config: ConfigSchema) -> Result<Self> {
        Ok(Self {
            backend,
            config: Arc::new(config),
            metrics: Arc::new(MetricsRegistry::new()),
            page: Arc::new(PageRenderer::new()?),
            tabs: Arc::new(TabSequencers::new(MAX_TABS)),
        })
    }

    /// Record into an existing registry instead of a private one
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// One request sequencer per browser tab
///
/// The page script sends a random tab id with each request; responses that a
/// newer request from the same tab has superseded are flagged as stale.
pub struct TabSequencers {
    capacity: usize,
    tabs: Mutex<HashMap<String, (Arc<RequestSequencer>, Instant)>>,
}

impl TabSequencers {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tabs: Mutex::new(HashMap::new()),
        }
    }

    /// Sequencer for a tab, evicting the least recently used tab when full
    pub fn get(&self, tab: &str) -> Arc<RequestSequencer> {
        let mut tabs = self.tabs.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((sequencer, last_seen)) = tabs.get_mut(tab) {
            *last_seen = Instant::now();
            return Arc::clone(sequencer);
        }

        if tabs.len() >= self.capacity {
            let oldest = tabs
                .iter()
                .min_by_key(|(_, (_, last_seen))| *last_seen)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tabs.remove(&oldest);
            }
        }

        let sequencer = Arc::new(RequestSequencer::new());
        tabs.insert(tab.to_string(), (Arc::clone(&sequencer), Instant::now()));
        sequencer
    }

    pub fn len(&self) -> usize {
        self.tabs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tab_shares_sequencer() {
        let tabs = TabSequencers::new(4);
        let a = tabs.get("tab-a");
        a.issue("teddy");
        assert_eq!(tabs.get("tab-a").latest_seq(), 1);
        assert_eq!(tabs.get("tab-b").latest_seq(), 0);
        assert_eq!(tabs.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_least_recent_tab() {
        let tabs = TabSequencers::new(2);
        tabs.get("a").issue("x");
        std::thread::sleep(std::time::Duration::from_millis(2));
        tabs.get("b");
        std::thread::sleep(std::time::Duration::from_millis(2));
        tabs.get("c");

        assert_eq!(tabs.len(), 2);
        // "a" was evicted, so it starts over
        assert_eq!(tabs.get("a").latest_seq(), 0);
    }
}
