//! Error types for fetching and scraping proxy sources

use thiserror::Error;

/// Why a single fetch attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchCause {
    /// Returns true if another attempt may succeed.
    ///
    /// Client errors are final, except 429 which asks us to come back later.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchCause::Timeout
            | FetchCause::Connect(_)
            | FetchCause::Body(_)
            | FetchCause::Transport(_) => true,
            FetchCause::Status(code) => *code == 429 || *code >= 500,
            FetchCause::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchCause {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchCause::Timeout
        } else if e.is_connect() {
            FetchCause::Connect(e.to_string())
        } else if e.is_builder() {
            FetchCause::InvalidUrl(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchCause::Body(e.to_string())
        } else {
            FetchCause::Transport(e.to_string())
        }
    }
}

/// A fetch that failed after all permitted attempts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetching {url} failed after {attempts} attempt(s): {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
    /// Number of requests actually issued
    pub attempts: u32,
}

/// Structural failure of a whole source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("expected field `{0}` missing from payload")]
    MissingField(&'static str),

    #[error("no element matches `{0}`")]
    MissingTable(&'static str),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        selector: &'static str,
        reason: String,
    },

    #[error("adapter panicked: {0}")]
    Panicked(String),
}

/// Failure to parse a user supplied tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid proxy type: {0}. Use: http, https, socks4, socks5")]
    ProxyType(String),

    #[error("invalid output format: {0}. Use: txt, json")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message() {
        let err = FetchError {
            url: "http://example.com".into(),
            cause: FetchCause::Timeout,
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("http://example.com"));
        assert!(msg.contains("after 3 attempt(s): request timed out"));
    }

    #[test]
    fn test_retryable_causes() {
        assert!(FetchCause::Timeout.is_retryable());
        assert!(FetchCause::Connect("refused".into()).is_retryable());
        assert!(FetchCause::Status(503).is_retryable());
        assert!(FetchCause::Status(429).is_retryable());
        assert!(!FetchCause::Status(404).is_retryable());
        assert!(!FetchCause::Status(403).is_retryable());
        assert!(!FetchCause::InvalidUrl("nope".into()).is_retryable());
    }
}
