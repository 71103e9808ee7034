//! Config command: show the effective configuration

use anyhow::Result;
use owo_colors::OwoColorize;
use recall_radar_cli::OutputFormat;
use recall_radar_cli::output::Status;
use recall_radar_client::ClientConfig;
use recall_radar_client::config::redacted;
use recall_radar_core::config::Config;

/// Print settings and search credentials, with the API key redacted
pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let client = ClientConfig::from_env();

    if format.is_json() {
        let json = serde_json::json!({
            "config_file": config.path,
            "settings": config.schema,
            "search_index": client.as_ref().ok(),
            "credentials_error": client.as_ref().err().map(ToString::to_string),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let schema = &config.schema;

    Status::header("Recall Radar Configuration");
    Status::field(
        "Config file",
        config.path.as_deref().unwrap_or("(defaults)"),
    );
    Status::field("Bind", &schema.server.bind);
    Status::field("Hits per page", &schema.search.hits_per_page.to_string());
    Status::field("Max query", &schema.search.max_query_length.to_string());
    Status::field("Cache TTL", &format!("{}s", schema.search.cache_ttl_secs));
    Status::field("Debounce", &format!("{}ms", schema.ui.debounce_ms));
    Status::field("Log level", &schema.logging.level);

    Status::header("Search Index");
    match client {
        Ok(client) => {
            Status::field("App id", &client.app_id);
            Status::field("API key", &redacted(&client.api_key));
            Status::field("Index", &client.index_name);
            Status::field("Host", &client.base_url());
            Status::field("Environment", &format!("{:?}", client.environment));
        }
        Err(e) => Status::field("Credentials", &e.to_string().yellow().to_string()),
    }

    Ok(())
}
