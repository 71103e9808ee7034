//! Error responses for the web surface

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recall_radar_search::ClassificationState;
use serde_json::json;
use thiserror::Error;

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, WebError>;

/// Web error types
#[derive(Error, Debug)]
pub enum WebError {
    /// Query rejected before searching
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Why the query was rejected
        message: String,
        /// Browser sequence number of the rejected request
        seq: Option<u64>,
    },

    /// Search backend failed; the page stays neutral
    #[error("Search temporarily unavailable: {message}")]
    SearchUnavailable {
        /// Backend failure description
        message: String,
        /// Browser sequence number of the failed request
        seq: Option<u64>,
        /// Query that failed
        query: String,
    },

    /// Page template failed to render
    #[error("Template error: {0}")]
    Template(String),
}

impl WebError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::SearchUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::SearchUnavailable { .. } => "SEARCH_UNAVAILABLE",
            Self::Template(_) => "TEMPLATE_ERROR",
        }
    }
}

impl From<handlebars::RenderError> for WebError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for WebError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            message = %message,
            "Request error"
        );

        let error = json!({
            "code": error_code,
            "message": message,
            "status": status.as_u16(),
        });

        // Search failures still answer in the shape of a search result
        let body = match self {
            Self::SearchUnavailable { seq, query, .. } => json!({
                "seq": seq,
                "query": query,
                "state": ClassificationState::Idle,
                "label": ClassificationState::Idle.label(),
                "nbHits": 0,
                "hits": [],
                "error": error,
            }),
            // No query survived validation, but the browser still needs the seq to settle
            Self::InvalidQuery { seq, .. } => json!({
                "seq": seq,
                "state": ClassificationState::Idle,
                "label": ClassificationState::Idle.label(),
                "nbHits": 0,
                "hits": [],
                "error": error,
            }),
            Self::Template(_) => json!({ "error": error }),
        };

        (status, Json(body)).into_response()
    }
}
