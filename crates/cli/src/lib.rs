//! Terminal helpers for the Recall Radar command-line tool
//!
//! - Status messages and risk badges
//! - Result cards for recall hits
//! - Spinners for network calls

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{OutputFormat, Status};
