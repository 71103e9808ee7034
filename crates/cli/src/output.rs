//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use recall_radar_search::{ClassificationState, RecallRecord};

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable text
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

impl OutputFormat {
    /// Whether JSON was requested
    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `key: value` line
    pub fn field(key: &str, value: &str) {
        println!("  {:<16} {}", format!("{key}:").dimmed(), value);
    }
}

/// Badge text without colour; empty for IDLE
pub fn badge_plain(state: ClassificationState) -> String {
    match state {
        ClassificationState::Idle => String::new(),
        ClassificationState::Red | ClassificationState::Orange => {
            format!("⚠ {}", state.label())
        }
        ClassificationState::Green => format!("✓ {}", state.label()),
    }
}

/// Badge coloured by state
pub fn badge(state: ClassificationState) -> String {
    let text = badge_plain(state);
    match state {
        ClassificationState::Idle => text,
        ClassificationState::Red => text.red().bold().to_string(),
        ClassificationState::Orange => text.yellow().bold().to_string(),
        ClassificationState::Green => text.green().bold().to_string(),
    }
}

/// Print one recall hit as a card
pub fn print_record(record: &RecallRecord) {
    let risk = format!("{} Risk", record.risk_level);
    let risk = if record.risk_level.is_serious() {
        risk.red().to_string()
    } else {
        risk.yellow().to_string()
    };

    println!();
    println!("  {}  {}", record.product_name.bold(), risk);
    Status::field("Brand / Model", &record.brand_model());
    Status::field("Source", &record.source);
    if let Some(batch) = &record.batch_number {
        Status::field("Batch", batch);
    }
    if !record.description.is_empty() {
        println!("  {}", record.description.italic());
    }
}

/// Print the badge and, for warnings, every hit
pub fn print_classification(state: ClassificationState, hits: &[RecallRecord]) {
    if state == ClassificationState::Idle {
        Status::info("Enter a product name to check its safety status.");
        return;
    }

    println!("{}", badge(state));

    if state.is_warning() {
        for hit in hits {
            print_record(hit);
        }
    } else {
        println!();
        println!("We could not find any official recall notices matching your search criteria.");
        println!(
            "{}",
            "Disclaimer: Based on official recall databases (RAPEX, DGCCRF, etc.) as indexed in our system."
                .dimmed()
        );
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
