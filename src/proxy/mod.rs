//! Proxy module for collecting proxies from public sources
//!
//! This module provides functionality for:
//! - Fetching source pages with a rotated browser identity and bounded retry
//! - Parsing plain lists, HTML tables and JSON APIs into raw records
//! - Normalizing raw records into typed proxy records
//! - Running every source in order and isolating failures
//! - Saving records grouped by proxy type

pub mod adapter;
pub mod aggregator;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod parser;
pub mod sources;
pub mod writer;

#[cfg(test)]
pub(crate) mod testutil;

pub use adapter::{Adapter, AdapterKind, Endpoint, JsonLayout, Scrape, Source, TableLayout};
pub use aggregator::{AggregationRun, Aggregator};
pub use fetcher::{Fetch, FetchConfig, HttpFetcher};
pub use models::{ProxyRecord, ProxyType, RawRecord, SourceResult};
pub use normalizer::{infer_type, normalize};
pub use parser::ProxyParser;
pub use sources::builtin_sources;
pub use writer::{read_file, OutputFormat, OutputWriter, WriteResult, WrittenFile};
