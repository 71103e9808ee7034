use crate::error::{Result, WebError};
use crate::page::{PageView, badge_text};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use recall_radar_search::{
    ClassificationState, RecallRecord, SearchRequest, SearchResponse, Ticket, classify,
    normalize_query,
};
use recall_radar_telemetry::names;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Browser sequence number, echoed back
    pub seq: Option<u64>,
    /// Browser tab id for server-side sequencing
    pub tab: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    pub seq: Option<u64>,
    pub query: String,
    pub state: ClassificationState,
    pub label: &'static str,
    pub badge: String,
    pub nb_hits: u64,
    pub hits: Vec<RecallRecord>,
    /// A newer request from the same tab arrived first
    pub stale: bool,
}

impl SearchPayload {
    fn new(seq: Option<u64>, query: String, state: ClassificationState) -> Self {
        Self {
            seq,
            query,
            state,
            label: state.label(),
            badge: badge_text(state),
            nb_hits: 0,
            hits: Vec::new(),
            stale: false,
        }
    }
}

/// Query the backend with timing and failure metrics
async fn fetch(state: &AppState, query: &str) -> std::result::Result<SearchResponse, String> {
    let request = SearchRequest::new(query).with_hits_per_page(state.config.search.hits_per_page);
    state.metrics.increment(names::SEARCH_REQUESTS);

    let timer = state.metrics.timer(names::SEARCH_LATENCY_MS);
    let result = state.backend.search(&request).await;
    let elapsed = timer.stop();

    match result {
        Ok(response) => {
            if response.cached {
                state.metrics.increment(names::SEARCH_CACHE_HITS);
            }
            debug!(
                backend = state.backend.name(),
                query = %query,
                hits = response.hits.len(),
                elapsed_ms = elapsed.as_millis(),
                "Search completed"
            );
            Ok(response)
        }
        Err(e) => {
            state.metrics.increment(names::SEARCH_FAILURES);
            warn!(
                backend = state.backend.name(),
                query = %query,
                error = %e,
                "Search failed"
            );
            Err(e.to_string())
        }
    }
}

fn record_state(state: &AppState, classification: ClassificationState) {
    state
        .metrics
        .increment(&names::classification(classification.as_str()));
}

/// `GET /api/search?q=&seq=&tab=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPayload>> {
    let query = normalize_query(&params.q, state.config.search.max_query_length)
        .map_err(|e| WebError::InvalidQuery {
            message: e.to_string(),
            seq: params.seq,
        })?;

    let tab = params.tab.as_deref().map(|tab| state.tabs.get(tab));
    let ticket: Option<Ticket> = tab.as_ref().map(|sequencer| sequencer.issue(query.clone()));

    if query.is_empty() {
        if let (Some(sequencer), Some(ticket)) = (&tab, &ticket) {
            sequencer.settle_idle(ticket);
        }
        record_state(&state, ClassificationState::Idle);
        return Ok(Json(SearchPayload::new(params.seq, query, ClassificationState::Idle)));
    }

    let response = match fetch(&state, &query).await {
        Ok(response) => response,
        Err(message) => {
            if let (Some(sequencer), Some(ticket)) = (&tab, &ticket) {
                sequencer.settle_idle(ticket);
            }
            record_state(&state, ClassificationState::Idle);
            return Err(WebError::SearchUnavailable {
                message,
                seq: params.seq,
                query,
            });
        }
    };

    let classification = classify(&query, &response.hits);
    let nb_hits = response.nb_hits;
    let hits = response.hits.clone();

    let stale = match (&tab, &ticket) {
        (Some(sequencer), Some(ticket)) => sequencer.accept(ticket, response).is_none(),
        _ => false,
    };
    if stale {
        state.metrics.increment(names::SEARCH_STALE_DROPPED);
    }

    record_state(&state, classification);
    info!(
        query = %query,
        state = %classification,
        nb_hits = nb_hits,
        stale = stale,
        "Query classified"
    );

    Ok(Json(SearchPayload {
        nb_hits,
        hits,
        stale,
        ..SearchPayload::new(params.seq, query, classification)
    }))
}

/// `GET /` with optional `?q=`
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>> {
    let config = &state.config;

    // An over-long query is cut to the limit rather than rejected
    let raw: String = params
        .q
        .trim()
        .chars()
        .take(config.search.max_query_length)
        .collect();

    let view = if raw.is_empty() {
        PageView::new(config, "", ClassificationState::Idle, &[])
    } else {
        match fetch(&state, &raw).await {
            Ok(response) => {
                let classification = classify(&raw, &response.hits);
                record_state(&state, classification);
                PageView::new(config, &raw, classification, &response.hits)
            }
            Err(_) => PageView::unavailable(config, &raw),
        }
    };

    Ok(Html(state.page.render(&view)?))
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub backend: BackendHealth,
}

#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub name: String,
    pub reachable: bool,
    pub latency_ms: u64,
    pub total_records: Option<u64>,
    pub error: Option<String>,
}

/// `GET /health`: liveness plus a zero-hit probe of the backend
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthPayload>) {
    let start = Instant::now();
    let result = state.backend.probe().await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let backend = match result {
        Ok(response) => BackendHealth {
            name: state.backend.name().to_string(),
            reachable: true,
            latency_ms,
            total_records: Some(response.nb_hits),
            error: None,
        },
        Err(e) => BackendHealth {
            name: state.backend.name().to_string(),
            reachable: false,
            latency_ms,
            total_records: None,
            error: Some(e.to_string()),
        },
    };

    // The server itself is up either way; only the search is degraded
    let (code, status) = if backend.reachable {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthPayload {
            status,
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: state.metrics.uptime_secs(),
            backend,
        }),
    )
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.metrics.gauge("server.tabs", state.tabs.len() as u64);
    Json(state.metrics.export_json())
}
