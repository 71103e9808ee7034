//! Health check command

use super::algolia_client;
use anyhow::Result;
use owo_colors::OwoColorize;
use recall_radar_cli::output::Status;
use recall_radar_cli::{OutputFormat, progress};
use recall_radar_client::prelude::*;
use recall_radar_core::config::Config;
use recall_radar_core::Error;

/// Probe the hosted index
pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let client = algolia_client(config)?;

    let spinner = progress::spinner_unless(format.is_json(), "Probing search index...");
    let report = client.health().check().await;
    progress::finish_clear(&spinner);

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.status.is_available() {
        Ok(())
    } else {
        let reason = report.error.unwrap_or_else(|| "no response".to_string());
        Err(Error::search_unavailable(format!("Search index unavailable: {reason}")).into())
    }
}

fn print_report(report: &HealthReport) {
    Status::header("Search Index Health");

    let status = match report.status {
        HealthStatus::Healthy => "✓ healthy".green().to_string(),
        HealthStatus::Degraded => "⚠ degraded".yellow().to_string(),
        HealthStatus::Unavailable => "✗ unavailable".red().to_string(),
    };
    Status::field("Status", &status);
    Status::field("Index", &report.index);
    if let Some(latency) = report.latency_ms {
        Status::field("Latency", &format!("{latency}ms"));
    }
    if let Some(total) = report.total_records {
        Status::field("Records", &total.to_string());
    }
    Status::field("Circuit", &format!("{:?}", report.circuit));
    if let Some(error) = &report.error {
        Status::field("Error", &error.red().to_string());
    }
}
