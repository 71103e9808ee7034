//! Serve command: run the web server

use super::backend;
use anyhow::{Context, Result};
use recall_radar_core::config::Config;
use recall_radar_core::Error;
use recall_radar_web::AppState;
use std::net::SocketAddr;
use std::path::Path;

/// Serve until Ctrl-C
pub async fn run(config: &Config, bind: Option<&str>, offline: Option<&Path>) -> Result<()> {
    let addr: SocketAddr = match bind {
        Some(bind) => bind.parse().map_err(|_| {
            Error::validation(format!("Invalid bind address: {bind}"))
                .with_suggestion("Use host:port, e.g. 127.0.0.1:3000")
        })?,
        None => config
            .schema
            .server
            .bind_addr()
            .ok_or_else(|| Error::config(format!("Invalid bind address: {}", config.schema.server.bind)))?,
    };

    let backend = backend(config, offline)?;
    tracing::info!(backend = backend.name(), "Search backend ready");

    let state = AppState::new(backend, config.schema.clone())?;

    recall_radar_web::serve(state, addr, shutdown_signal())
        .await
        .with_context(|| format!("serving on {addr}"))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
