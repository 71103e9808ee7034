//! Recall search and risk classification for Recall Radar.
//!
//! This crate provides:
//! - The recall record model as returned by the hosted index
//! - The four-state risk classifier (IDLE, RED, ORANGE, GREEN)
//! - The [`SearchBackend`] seam plus an in-memory [`StubBackend`]
//! - Request sequencing so only the newest query's result is shown
//!
//! # Example
//!
//! ```
//! use recall_radar_search::{ClassificationState, RecallRecord, classify};
//!
//! let hits = vec![RecallRecord::new("1", "Teddy Bear").with_typos(0)];
//! assert_eq!(classify("ToyWorld Teddy", &hits), ClassificationState::Red);
//! assert_eq!(classify("", &hits), ClassificationState::Idle);
//! ```

mod backend;
mod classify;
mod error;
mod record;
mod sequence;

pub use backend::{
    DEFAULT_HITS_PER_PAGE, SearchBackend, SearchRequest, SearchResponse, StubBackend, StubFixture,
};
pub use classify::{ClassificationState, classify, min_typos};
pub use error::{Result, SearchError};
pub use record::{RankingInfo, RecallRecord, RiskLevel};
pub use sequence::{
    DEFAULT_MAX_QUERY_LENGTH, Outcome, RequestSequencer, SearchSession, Ticket, normalize_query,
};
