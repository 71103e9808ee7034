//! Recall Radar - check consumer products against official recall databases
//!
//! Serves the search page, or checks a single product from the terminal.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use recall_radar_cli::OutputFormat;
use recall_radar_core::config::Config;
use recall_radar_core::error::exit_codes;
use recall_radar_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

/// Check products against official recall databases
#[derive(Parser)]
#[command(name = "recall-radar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to .recall-radar.toml if present)
    #[arg(short, long, global = true, env = "RECALL_RADAR_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the search page and JSON API
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(short, long)]
        bind: Option<String>,

        /// Answer from a fixture file instead of the hosted index
        #[arg(long, value_name = "FIXTURE")]
        offline: Option<PathBuf>,
    },

    /// Classify one product query
    Check {
        /// Brand, model or product name
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Answer from a fixture file instead of the hosted index
        #[arg(long, value_name = "FIXTURE")]
        offline: Option<PathBuf>,
    },

    /// Probe the hosted search index
    Health {
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report(&anyhow::Error::new(e)),
    };

    let mut telemetry = TelemetryConfig::from(&config.schema.logging);
    if cli.verbose {
        telemetry = telemetry.verbose();
    }
    let _guard = match recall_radar_telemetry::init_with_config(&telemetry) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            None
        }
    };

    let result = match cli.command {
        Commands::Serve { bind, offline } => {
            commands::serve::run(&config, bind.as_deref(), offline.as_deref()).await
        }
        Commands::Check {
            query,
            format,
            offline,
        } => commands::check::run(&config, &query.join(" "), offline.as_deref(), format).await,
        Commands::Health { format } => commands::health::run(&config, format).await,
        Commands::Config { format } => commands::config::run(&config, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

/// Print an error and pick the exit code for its category
fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let code = err
        .downcast_ref::<recall_radar_core::Error>()
        .map_or(exit_codes::FAILURE, |e| e.code.exit_code());
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
