//! Runs adapters one after another and collects per-source results

use crate::error::AdapterError;
use crate::proxy::adapter::{Adapter, Scrape};
use crate::proxy::fetcher::Fetch;
use crate::proxy::models::SourceResult;
use crate::proxy::normalizer::normalize;
use crate::proxy::sources::builtin_sources;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

/// Results of one aggregation run, in registration order
#[derive(Debug, Clone)]
pub struct AggregationRun {
    pub results: Vec<SourceResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AggregationRun {
    /// Look up a source's result by name
    pub fn get(&self, source: &str) -> Option<&SourceResult> {
        self.results.iter().find(|r| r.source == source)
    }

    /// Total records across all sources
    pub fn total(&self) -> usize {
        self.results.iter().map(SourceResult::len).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Orchestrates registered adapters over a shared fetcher
pub struct Aggregator {
    fetcher: Arc<dyn Fetch>,
    adapters: Vec<Box<dyn Adapter>>,
}

impl Aggregator {
    /// Create an aggregator with no sources
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            adapters: Vec::new(),
        }
    }

    /// Create an aggregator with every built-in source registered
    pub fn with_builtin_sources(fetcher: Arc<dyn Fetch>) -> Self {
        let mut aggregator = Self::new(fetcher);
        for source in builtin_sources() {
            aggregator.register(Box::new(source));
        }
        aggregator
    }

    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        self.adapters.push(adapter);
    }

    /// Names of registered sources, in run order
    pub fn source_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Run every registered adapter in registration order.
    ///
    /// A failing or panicking adapter is recorded as that source's error and
    /// the run moves on to the next source.
    pub async fn run_all(&self) -> AggregationRun {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(self.adapters.len());
        let mut total = 0;

        for adapter in &self.adapters {
            let result = self.run_adapter(adapter.as_ref()).await;
            total += result.len();
            info!(source = %result.source, running_total = total, "source finished");
            results.push(result);
        }

        AggregationRun {
            results,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Run the named sources (case-insensitive) in the order given.
    ///
    /// Names that match no registered adapter are skipped.
    pub async fn run_selected(&self, sources: &[String]) -> AggregationRun {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            match self.run_one(source).await {
                Some(result) => results.push(result),
                None => warn!(source = %source, "unknown source skipped"),
            }
        }

        AggregationRun {
            results,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Run a single source by name (case-insensitive)
    pub async fn run_one(&self, source: &str) -> Option<SourceResult> {
        let adapter = self
            .adapters
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(source))?;
        Some(self.run_adapter(adapter.as_ref()).await)
    }

    async fn run_adapter(&self, adapter: &dyn Adapter) -> SourceResult {
        let name = adapter.name().to_string();
        let fetcher = self.fetcher.as_ref();
        let scrape = match AssertUnwindSafe(async { adapter.scrape(fetcher).await })
            .catch_unwind()
            .await
        {
            Ok(scrape) => scrape,
            Err(panic) => Scrape::failed(AdapterError::Panicked(panic_message(panic))),
        };

        let Scrape {
            records,
            skipped,
            failed_endpoints,
            error,
        } = scrape;

        let mut result = match error {
            Some(error) => {
                warn!(source = %name, %error, "source failed");
                SourceResult::failure(name, error)
            }
            None => {
                let records = records.into_iter().map(|r| normalize(r, &name)).collect();
                let result = SourceResult::success(name, records);
                info!(
                    source = %result.source,
                    records = result.len(),
                    skipped,
                    failed_endpoints,
                    "source scraped"
                );
                result
            }
        };
        result.skipped = skipped;
        result.failed_endpoints = failed_endpoints;
        result
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
