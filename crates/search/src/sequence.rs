//! Request sequencing: last query wins, not last response.
//!
//! Every submitted query gets a ticket with a strictly increasing sequence
//! number. A response is classified only if its ticket is still the newest
//! one issued; anything older is dropped. This holds no matter which order
//! the backend answers in.

use crate::backend::{SearchBackend, SearchRequest, SearchResponse};
use crate::classify::{ClassificationState, classify};
use crate::error::{Result, SearchError};
use crate::record::RecallRecord;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Longest accepted query unless configured otherwise.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 512;

/// Trim a raw query and enforce the length limit.
pub fn normalize_query(raw: &str, max_len: usize) -> Result<String> {
    let query = raw.trim();
    let len = query.chars().count();
    if len > max_len {
        return Err(SearchError::InvalidQuery(format!(
            "query is {len} characters long, the limit is {max_len}"
        )));
    }
    Ok(query.to_string())
}

/// Proof that a query was submitted, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub query: String,
}

/// The classification currently on display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub seq: u64,
    pub query: String,
    pub state: ClassificationState,
    /// Total matches reported by the index
    pub nb_hits: u64,
    pub hits: Vec<RecallRecord>,
}

impl Outcome {
    fn idle(ticket: &Ticket) -> Self {
        Self {
            seq: ticket.seq,
            query: ticket.query.clone(),
            state: ClassificationState::Idle,
            nb_hits: 0,
            hits: Vec::new(),
        }
    }
}

/// Issues tickets and keeps the outcome of the newest one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
    stale_dropped: AtomicU64,
    current: Mutex<Option<Outcome>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a query; it supersedes every earlier ticket.
    pub fn issue(&self, query: impl Into<String>) -> Ticket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            seq,
            query: query.into(),
        }
    }

    /// Whether no newer ticket has been issued.
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    /// Sequence number of the newest ticket (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Classify a response if its ticket is still the newest.
    ///
    /// Returns `None` and drops the response when the ticket is stale.
    pub fn accept(&self, ticket: &Ticket, response: SearchResponse) -> Option<Outcome> {
        let state = classify(&ticket.query, &response.hits);
        self.settle(
            ticket,
            Outcome {
                seq: ticket.seq,
                query: ticket.query.clone(),
                state,
                nb_hits: response.nb_hits,
                hits: response.hits,
            },
        )
    }

    /// Settle the newest ticket as IDLE: empty query, or a failed search.
    pub fn settle_idle(&self, ticket: &Ticket) -> Option<Outcome> {
        self.settle(ticket, Outcome::idle(ticket))
    }

    fn settle(&self, ticket: &Ticket, outcome: Outcome) -> Option<Outcome> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());

        // Checked under the lock so two settles cannot interleave
        if !self.is_latest(ticket) {
            self.stale_dropped.fetch_add(1, Ordering::Relaxed);
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq(),
                query = %ticket.query,
                "Dropping stale search result"
            );
            return None;
        }

        *current = Some(outcome.clone());
        Some(outcome)
    }

    /// Outcome of the newest settled ticket.
    pub fn current(&self) -> Option<Outcome> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// State on display; IDLE before anything settles.
    pub fn current_state(&self) -> ClassificationState {
        self.current().map_or(ClassificationState::Idle, |o| o.state)
    }

    /// Responses dropped because a newer query superseded them.
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped.load(Ordering::Relaxed)
    }
}

/// A backend paired with a sequencer: one search box's worth of state.
pub struct SearchSession<B> {
    backend: B,
    sequencer: RequestSequencer,
    hits_per_page: u32,
    max_query_length: usize,
}

impl<B: SearchBackend> SearchSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            sequencer: RequestSequencer::new(),
            hits_per_page: crate::backend::DEFAULT_HITS_PER_PAGE,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
        }
    }

    #[must_use]
    pub fn with_hits_per_page(mut self, hits_per_page: u32) -> Self {
        self.hits_per_page = hits_per_page;
        self
    }

    #[must_use]
    pub fn with_max_query_length(mut self, max_query_length: usize) -> Self {
        self.max_query_length = max_query_length;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    /// Submit a query and wait for its result.
    ///
    /// `Ok(None)` means a newer query superseded this one while it was in
    /// flight. An empty query settles as IDLE without calling the backend.
    /// A backend failure on the newest query settles as IDLE and is returned
    /// as an error; on a superseded query it is ignored.
    pub async fn search(&self, raw_query: &str) -> Result<Option<Outcome>> {
        let query = normalize_query(raw_query, self.max_query_length)?;
        let ticket = self.sequencer.issue(query);

        if ticket.query.is_empty() {
            return Ok(self.sequencer.settle_idle(&ticket));
        }

        let request = SearchRequest::new(ticket.query.clone()).with_hits_per_page(self.hits_per_page);

        match self.backend.search(&request).await {
            Ok(response) => Ok(self.sequencer.accept(&ticket, response)),
            Err(err) => {
                if self.sequencer.settle_idle(&ticket).is_some() {
                    Err(err)
                } else {
                    Ok(None)
                }
            }
        }
    }
}
