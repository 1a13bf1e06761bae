//! Proxy data models

use crate::error::{AdapterError, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proxy type enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    pub const ALL: [ProxyType; 4] = [
        ProxyType::Http,
        ProxyType::Https,
        ProxyType::Socks4,
        ProxyType::Socks5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ProxyType::Http),
            "https" => Ok(ProxyType::Https),
            "socks4" => Ok(ProxyType::Socks4),
            "socks5" => Ok(ProxyType::Socks5),
            _ => Err(ParseError::ProxyType(s.to_string())),
        }
    }
}

/// A proxy entry as an adapter extracted it, before normalization.
///
/// Only constructible with a non-empty address and a port in 1..=65535;
/// rows that cannot satisfy this are dropped by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    address: String,
    port: u16,
    proxy_type: Option<String>,
    country: Option<String>,
    anonymity: Option<String>,
}

impl RawRecord {
    /// Build a raw record from already-split host and port cells
    pub fn new(address: &str, port: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() || address.contains(':') || address.contains(char::is_whitespace) {
            return None;
        }
        Some(Self {
            address: address.to_string(),
            port: parse_port(port)?,
            proxy_type: None,
            country: None,
            anonymity: None,
        })
    }

    /// Set the raw type tag; blank tags count as missing
    pub fn with_type(mut self, tag: Option<&str>) -> Self {
        self.proxy_type = non_blank(tag);
        self
    }

    pub fn with_country(mut self, country: Option<&str>) -> Self {
        self.country = non_blank(country);
        self
    }

    pub fn with_anonymity(mut self, anonymity: Option<&str>) -> Self {
        self.anonymity = non_blank(anonymity);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.proxy_type.as_deref()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (String, u16, Option<String>, Option<String>, Option<String>) {
        (
            self.address,
            self.port,
            self.proxy_type,
            self.country,
            self.anonymity,
        )
    }
}

impl From<ProxyRecord> for RawRecord {
    fn from(record: ProxyRecord) -> Self {
        Self {
            address: record.address,
            port: record.port,
            proxy_type: Some(record.proxy_type.to_string()),
            country: record.country,
            anonymity: record.anonymity,
        }
    }
}

/// Parse a port cell, rejecting 0 and anything outside u16
pub fn parse_port(s: &str) -> Option<u16> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Canonical proxy record shared by every source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    #[serde(rename = "ip")]
    address: String,
    #[serde(with = "port_string")]
    port: u16,
    #[serde(rename = "type")]
    proxy_type: ProxyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anonymity: Option<String>,
    source: String,
}

impl ProxyRecord {
    pub fn new(address: String, port: u16, proxy_type: ProxyType, source: String) -> Self {
        Self {
            address,
            port,
            proxy_type,
            country: None,
            anonymity: None,
            source,
        }
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn with_anonymity(mut self, anonymity: Option<String>) -> Self {
        self.anonymity = anonymity;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.proxy_type
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn anonymity(&self) -> Option<&str> {
        self.anonymity.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the proxy URL string
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.address, self.port)
    }

    /// Get the proxy string in IP:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// Ports travel as strings in JSON output, the way sources publish them.
mod port_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(port: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&port.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let text = match PortRepr::deserialize(deserializer)? {
            PortRepr::Text(s) => s,
            PortRepr::Number(n) => n.to_string(),
        };
        super::parse_port(&text).ok_or_else(|| D::Error::custom(format!("invalid port: {text}")))
    }
}

/// Outcome of scraping one source during a run
#[derive(Debug, Clone)]
pub struct SourceResult {
    /// The source that was scraped
    pub source: String,
    /// Normalized records, in the order the source listed them
    pub records: Vec<ProxyRecord>,
    /// Rows, lines or entries dropped as malformed
    pub skipped: usize,
    /// Endpoints whose fetch failed
    pub failed_endpoints: usize,
    /// Set when the source as a whole failed
    pub error: Option<AdapterError>,
}

impl SourceResult {
    /// Create a successful result
    pub fn success(source: String, records: Vec<ProxyRecord>) -> Self {
        Self {
            source,
            records,
            skipped: 0,
            failed_endpoints: 0,
            error: None,
        }
    }

    /// Create a failed result; a failed source never carries records
    pub fn failure(source: String, error: AdapterError) -> Self {
        Self {
            source,
            records: Vec::new(),
            skipped: 0,
            failed_endpoints: 0,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProxyRecord {
        ProxyRecord::new("127.0.0.1".to_string(), 8080, ProxyType::Http, "test".to_string())
    }

    #[test]
    fn test_proxy_type_from_str() {
        assert_eq!("HTTP".parse::<ProxyType>().unwrap(), ProxyType::Http);
        assert_eq!(" socks5 ".parse::<ProxyType>().unwrap(), ProxyType::Socks5);
        assert!("socks6".parse::<ProxyType>().is_err());
    }

    #[test]
    fn test_proxy_type_display_matches_serde() {
        for ptype in ProxyType::ALL {
            let json = serde_json::to_string(&ptype).unwrap();
            assert_eq!(json, format!("\"{}\"", ptype));
        }
    }

    #[test]
    fn test_raw_record_validation() {
        assert!(RawRecord::new("10.0.0.1", "8080").is_some());
        assert!(RawRecord::new("", "8080").is_none());
        assert!(RawRecord::new("10.0.0.1", "0").is_none());
        assert!(RawRecord::new("10.0.0.1", "65536").is_none());
        assert!(RawRecord::new("10.0.0.1", "abc").is_none());
        assert!(RawRecord::new("10.0.0.1:80", "8080").is_none());
    }

    #[test]
    fn test_raw_record_blank_fields_are_missing() {
        let raw = RawRecord::new("10.0.0.1", " 3128 ")
            .unwrap()
            .with_type(Some("  "))
            .with_country(Some(""))
            .with_anonymity(Some("elite"));
        assert_eq!(raw.port(), 3128);
        assert!(raw.type_tag().is_none());
        let (_, _, _, country, anonymity) = raw.into_parts();
        assert!(country.is_none());
        assert_eq!(anonymity.as_deref(), Some("elite"));
    }

    #[test]
    fn test_proxy_url() {
        let proxy = ProxyRecord::new(
            "192.168.1.1".to_string(),
            1080,
            ProxyType::Socks5,
            "test".to_string(),
        );
        assert_eq!(proxy.url(), "socks5://192.168.1.1:1080");
        assert_eq!(proxy.to_simple_string(), "192.168.1.1:1080");
        assert_eq!(proxy.to_string(), proxy.url());
    }

    #[test]
    fn test_json_shape() {
        let proxy = record().with_country(Some("Brazil".to_string()));
        let value = serde_json::to_value(&proxy).unwrap();
        assert_eq!(value["ip"], "127.0.0.1");
        assert_eq!(value["port"], "8080");
        assert_eq!(value["type"], "http");
        assert_eq!(value["country"], "Brazil");
        assert_eq!(value["source"], "test");
        assert!(value.get("anonymity").is_none());
    }

    #[test]
    fn test_json_port_accepts_number() {
        let json = r#"{"ip":"1.2.3.4","port":3128,"type":"https","source":"s"}"#;
        let proxy: ProxyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(proxy.port(), 3128);
        assert_eq!(proxy.proxy_type(), ProxyType::Https);

        let zero = r#"{"ip":"1.2.3.4","port":"0","type":"http","source":"s"}"#;
        assert!(serde_json::from_str::<ProxyRecord>(zero).is_err());
    }

    #[test]
    fn test_source_result() {
        let result = SourceResult::success("test".to_string(), vec![record(), record()]);
        assert!(result.is_success());
        assert_eq!(result.len(), 2);

        let result = SourceResult::failure(
            "test".to_string(),
            AdapterError::MissingField("proxies"),
        );
        assert!(!result.is_success());
        assert!(result.is_empty());
    }
}
