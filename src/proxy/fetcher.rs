//! HTTP fetching with rotated browser identity and bounded retry

use crate::error::{FetchCause, FetchError};
use crate::Result;
use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default number of attempts per URL
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between attempts in milliseconds
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Browser identities rotated across requests
pub const DEFAULT_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

/// Anything that can turn a URL into a response body.
///
/// Adapters only see this trait, so sources can be exercised against
/// canned payloads.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, std::result::Result<String, FetchError>>;
}

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for each request
    pub timeout: Duration,
    /// Total attempts per URL; 0 behaves like 1
    pub max_retries: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// Pool of User-Agent strings picked at random per request
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.user_agents = user_agents;
        self
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Fetcher backed by reqwest
#[derive(Clone)]
pub struct HttpFetcher {
    config: FetchConfig,
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn pick_user_agent(&self) -> &str {
        self.config
            .user_agents
            .choose(&mut rand::thread_rng())
            .map_or(DEFAULT_USER_AGENTS[0], String::as_str)
    }

    /// Issue one request
    async fn attempt(&self, url: Url) -> std::result::Result<String, FetchCause> {
        let user_agent = self.pick_user_agent().to_string();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, DEFAULT_ACCEPT)
            .header(ACCEPT_LANGUAGE, DEFAULT_ACCEPT_LANGUAGE)
            .header(CONNECTION, "keep-alive")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Fetch a URL, retrying transient failures up to the configured bound
    pub async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError {
            url: url.to_string(),
            cause: FetchCause::InvalidUrl(e.to_string()),
            attempts: 0,
        })?;

        let max_attempts = self.config.attempts();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(parsed.clone()).await {
                Ok(body) => {
                    debug!(%url, attempts, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                Err(cause) if cause.is_retryable() && attempts < max_attempts => {
                    debug!(%url, attempts, %cause, "attempt failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(cause) => {
                    warn!(%url, attempts, %cause, "fetch failed");
                    return Err(FetchError {
                        url: url.to_string(),
                        cause,
                        attempts,
                    });
                }
            }
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, std::result::Result<String, FetchError>> {
        Box::pin(self.fetch_text(url))
    }
}
