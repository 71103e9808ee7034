//! Web server for Recall Radar
//!
//! Serves the search page and a small JSON API:
//! - `GET /` renders the page, optionally pre-searched with `?q=`
//! - `GET /api/search?q=&seq=&tab=` classifies one query
//! - `GET /health` reports liveness and backend reachability
//! - `GET /metrics` exports the metrics registry

mod error;
mod handlers;
pub mod page;
mod state;

pub use error::{Result, WebError};
pub use handlers::{BackendHealth, HealthPayload, SearchParams, SearchPayload};
pub use state::{AppState, TabSequencers};

use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/search", get(handlers::search))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Recall Radar listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
