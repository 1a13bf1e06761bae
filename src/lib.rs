//! Proxy Harvest - Proxy List Aggregator
//!
//! Collects proxy listings from public sources (plain lists, HTML tables,
//! JSON APIs), normalizes them into typed records and saves them grouped
//! by proxy type.

pub mod error;
pub mod proxy;

pub use error::{AdapterError, FetchCause, FetchError, ParseError};
pub use proxy::*;

use std::path::PathBuf;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory output files are written to
    pub output_dir: PathBuf,
    /// Format of output files
    pub format: OutputFormat,
    /// HTTP fetch settings
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(proxy::writer::DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            fetch: FetchConfig::default(),
        }
    }
}
