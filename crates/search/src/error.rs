//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query rejected before reaching the backend
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Canned responses could not be parsed
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    /// The search backend failed or could not be reached
    #[error("Search backend error: {0}")]
    Backend(String),
}

impl SearchError {
    /// Wrap any backend error
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}
