//! Check command: classify one query from the terminal

use super::{backend, search_error};
use anyhow::{Result, bail};
use recall_radar_cli::output::{self, Status};
use recall_radar_cli::{OutputFormat, progress};
use recall_radar_core::config::Config;
use recall_radar_search::SearchSession;
use recall_radar_telemetry::{Timer, metrics, names};
use std::path::Path;

/// Run one query and print its classification
pub async fn run(
    config: &Config,
    query: &str,
    offline: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let backend = backend(config, offline)?;
    let backend_name = backend.name().to_string();
    let session = SearchSession::new(backend)
        .with_hits_per_page(config.schema.search.hits_per_page)
        .with_max_query_length(config.schema.search.max_query_length);

    let spinner = progress::spinner_unless(format.is_json(), "Searching recall databases...");
    let timer = Timer::start(names::SEARCH_LATENCY_MS);
    let result = session.search(query).await;
    let elapsed = timer.stop();
    progress::finish_clear(&spinner);

    let outcome = match result {
        Ok(Some(outcome)) => outcome,
        // Only one query is ever in flight here
        Ok(None) => bail!("query was superseded"),
        Err(e) => {
            metrics().increment(names::SEARCH_FAILURES);
            return Err(search_error(e).into());
        }
    };
    metrics().increment(&names::classification(outcome.state.as_str()));

    tracing::info!(
        query = %outcome.query,
        state = %outcome.state,
        nb_hits = outcome.nb_hits,
        elapsed_ms = elapsed.as_millis(),
        "Query classified"
    );

    if format.is_json() {
        let json = serde_json::json!({
            "query": outcome.query,
            "state": outcome.state,
            "label": outcome.state.label(),
            "nbHits": outcome.nb_hits,
            "hits": outcome.hits,
            "backend": backend_name,
            "elapsedMs": u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    Status::header(&format!("Recall check: {}", outcome.query));
    output::print_classification(outcome.state, &outcome.hits);
    println!();
    Status::field(
        "Matches",
        &output::format_count(outcome.nb_hits, "record", "records"),
    );
    Status::field("Took", &output::format_duration(elapsed));
    Ok(())
}
