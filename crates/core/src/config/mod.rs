//! Configuration loading and schema definitions
//!
//! File-based settings for the server, search requests, page and logging.
//! Credentials are not read here; they come from the environment through the
//! search client configuration.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
