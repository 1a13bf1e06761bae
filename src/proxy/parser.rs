//! Line-oriented parsing: plain `ip:port` lists and our own txt output

use crate::proxy::models::{parse_port, ProxyRecord, ProxyType, RawRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// `type://host:port` with an optional `  # key=value ...` comment
static OUTPUT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?|socks[45])://([^\s:/]+):(\d{1,5})(?:\s+#\s*(.*))?$")
        .expect("Invalid output line regex")
});

/// Metadata keys written after the `#` of an output line
static METADATA_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(country|anon|src)=").expect("Invalid metadata regex"));

/// Records parsed from a payload plus the count of lines dropped
#[derive(Debug, Default)]
pub struct Parsed {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

impl Parsed {
    pub fn push(&mut self, record: Option<RawRecord>) {
        match record {
            Some(record) => self.records.push(record),
            None => self.skipped += 1,
        }
    }
}

/// Proxy parser for line-based formats
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single `ip:port` line.
    ///
    /// The line must contain exactly one colon with a non-empty host and a
    /// port in 1..=65535.
    pub fn parse_line(line: &str) -> Option<RawRecord> {
        let (host, port) = line.trim().split_once(':')?;
        if port.contains(':') {
            return None;
        }
        RawRecord::new(host, port)
    }

    /// Parse a newline-separated `ip:port` payload, tagging every record
    /// with the type its endpoint serves. Blank lines are not counted as
    /// skipped.
    pub fn parse_plain_list(content: &str, proxy_type: ProxyType) -> Parsed {
        let mut parsed = Parsed::default();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            parsed.push(
                Self::parse_line(line).map(|r| r.with_type(Some(proxy_type.as_str()))),
            );
        }
        parsed
    }

    /// Parse one line of txt output back into a record.
    ///
    /// `source` is used when the line carries no `src=` metadata.
    pub fn parse_output_line(line: &str, source: &str) -> Option<ProxyRecord> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let caps = OUTPUT_LINE_REGEX.captures(line)?;
        let proxy_type: ProxyType = caps[1].parse().ok()?;
        let port = parse_port(&caps[3])?;

        let mut country = None;
        let mut anonymity = None;
        let mut src = None;
        if let Some(comment) = caps.get(4) {
            for (key, value) in Self::split_metadata(comment.as_str()) {
                match key {
                    "country" => country = Some(value),
                    "anon" => anonymity = Some(value),
                    "src" => src = Some(value),
                    _ => {}
                }
            }
        }

        Some(
            ProxyRecord::new(
                caps[2].to_string(),
                port,
                proxy_type,
                src.unwrap_or_else(|| source.to_string()),
            )
            .with_country(country)
            .with_anonymity(anonymity),
        )
    }

    /// Parse a whole txt output file
    pub fn parse_output(content: &str, source: &str) -> Vec<ProxyRecord> {
        content
            .lines()
            .filter_map(|line| Self::parse_output_line(line, source))
            .collect()
    }

    /// Values may contain spaces, so each one runs up to the next known key.
    fn split_metadata(comment: &str) -> Vec<(&str, String)> {
        let keys: Vec<_> = METADATA_KEY_REGEX.captures_iter(comment).collect();
        keys.iter()
            .enumerate()
            .filter_map(|(i, caps)| {
                let key = caps.get(1)?;
                let start = caps.get(0)?.end();
                let end = keys
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(comment.len(), |m| m.start());
                Some((key.as_str(), comment[start..end].trim().to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_format() {
        let raw = ProxyParser::parse_line("192.168.1.1:8080").unwrap();
        assert_eq!(raw.address(), "192.168.1.1");
        assert_eq!(raw.port(), 8080);
    }

    #[test]
    fn test_parse_line_trims_crlf() {
        let raw = ProxyParser::parse_line(" 10.0.0.1:3128\r").unwrap();
        assert_eq!(raw.address(), "10.0.0.1");
        assert_eq!(raw.port(), 3128);
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(ProxyParser::parse_line("not-a-line").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1:abc").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1:8080:user:pass").is_none());
        assert!(ProxyParser::parse_line(":8080").is_none());
        assert!(ProxyParser::parse_line("10.0.0.1:0").is_none());
    }

    #[test]
    fn test_plain_list_skips_malformed_lines() {
        let content = "10.0.0.1:8080\nnot-a-line\n10.0.0.2:3128\n";
        let parsed = ProxyParser::parse_plain_list(content, ProxyType::Http);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.records[0].address(), "10.0.0.1");
        assert_eq!(parsed.records[1].address(), "10.0.0.2");
    }

    #[test]
    fn test_plain_list_tags_endpoint_type() {
        let parsed = ProxyParser::parse_plain_list("1.1.1.1:1080\n\n", ProxyType::Socks5);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.records[0].type_tag(), Some("socks5"));
    }

    #[test]
    fn test_parse_output_line_plain() {
        let record = ProxyParser::parse_output_line("socks4://10.0.0.1:1080", "fallback").unwrap();
        assert_eq!(record.proxy_type(), ProxyType::Socks4);
        assert_eq!(record.address(), "10.0.0.1");
        assert_eq!(record.port(), 1080);
        assert_eq!(record.source(), "fallback");
        assert!(record.country().is_none());
    }

    #[test]
    fn test_parse_output_line_with_metadata() {
        let line = "https://10.0.0.1:443  # country=United States anon=elite proxy src=Free Proxy List";
        let record = ProxyParser::parse_output_line(line, "fallback").unwrap();
        assert_eq!(record.proxy_type(), ProxyType::Https);
        assert_eq!(record.country(), Some("United States"));
        assert_eq!(record.anonymity(), Some("elite proxy"));
        assert_eq!(record.source(), "Free Proxy List");
    }

    #[test]
    fn test_parse_output_skips_garbage() {
        let content = "# header\nhttp://1.2.3.4:80  # src=x\nftp://1.2.3.4:21\n\nhttp://1.2.3.4:99999\n";
        let records = ProxyParser::parse_output(content, "x");
        assert_eq!(records.len(), 1);
    }
}
