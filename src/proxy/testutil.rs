//! Test doubles shared by the adapter and aggregator tests

use crate::error::{FetchCause, FetchError};
use crate::proxy::fetcher::Fetch;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned bodies by URL; unknown URLs fail with a connect error.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Result<String, FetchCause>>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, cause: FetchCause) -> Self {
        self.bodies.insert(url.to_string(), Err(cause));
        self
    }

    /// URLs requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetch for StaticFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        self.requested.lock().unwrap().push(url.to_string());
        let result = match self.bodies.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(cause)) => Err(FetchError {
                url: url.to_string(),
                cause: cause.clone(),
                attempts: 1,
            }),
            None => Err(FetchError {
                url: url.to_string(),
                cause: FetchCause::Connect("connection refused".to_string()),
                attempts: 1,
            }),
        };
        Box::pin(async move { result })
    }
}
