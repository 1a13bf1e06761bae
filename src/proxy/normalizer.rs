//! Turns raw adapter output into canonical proxy records

use crate::proxy::models::{ProxyRecord, ProxyType, RawRecord};

/// Substring patterns checked in order; the first hit wins.
const TYPE_PATTERNS: [(&str, ProxyType); 4] = [
    ("socks4", ProxyType::Socks4),
    ("socks5", ProxyType::Socks5),
    ("https", ProxyType::Https),
    ("http", ProxyType::Http),
];

/// Guess a proxy type from free text such as a source name.
///
/// Best-effort heuristic over display names; falls back to `http`.
pub fn infer_type(source_name: &str) -> ProxyType {
    match_pattern(source_name).unwrap_or_default()
}

fn match_pattern(text: &str) -> Option<ProxyType> {
    let text = text.to_lowercase();
    TYPE_PATTERNS
        .iter()
        .find(|(pattern, _)| text.contains(pattern))
        .map(|(_, ptype)| *ptype)
}

/// Resolve a raw type tag such as `"HTTPS"` or `"SOCKS5 (elite)"`
fn resolve_tag(tag: &str) -> Option<ProxyType> {
    tag.parse().ok().or_else(|| match_pattern(tag))
}

/// Convert a raw record into a canonical one. Never fails.
pub fn normalize(raw: RawRecord, source_name: &str) -> ProxyRecord {
    let (address, port, tag, country, anonymity) = raw.into_parts();
    let proxy_type = tag
        .as_deref()
        .and_then(resolve_tag)
        .unwrap_or_else(|| infer_type(source_name));

    ProxyRecord::new(address, port, proxy_type, source_name.to_string())
        .with_country(country)
        .with_anonymity(anonymity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: Option<&str>) -> RawRecord {
        RawRecord::new("10.0.0.1", "8080").unwrap().with_type(tag)
    }

    #[test]
    fn test_infer_type_from_source_name() {
        assert_eq!(infer_type("SOCKS5 Public List"), ProxyType::Socks5);
        assert_eq!(infer_type("my socks4 feed"), ProxyType::Socks4);
        assert_eq!(infer_type("HTTPS only"), ProxyType::Https);
        assert_eq!(infer_type("Spys.One"), ProxyType::Http);
        assert_eq!(infer_type(""), ProxyType::Http);
    }

    #[test]
    fn test_missing_type_uses_source_name() {
        let record = normalize(raw(None), "SOCKS5 Public List");
        assert_eq!(record.proxy_type(), ProxyType::Socks5);
        assert_eq!(record.source(), "SOCKS5 Public List");
    }

    #[test]
    fn test_tag_is_lowercased() {
        assert_eq!(normalize(raw(Some("HTTPS")), "x").proxy_type(), ProxyType::Https);
        assert_eq!(normalize(raw(Some("Socks4")), "x").proxy_type(), ProxyType::Socks4);
    }

    #[test]
    fn test_decorated_tag_is_matched() {
        let record = normalize(raw(Some("HTTP (Mikrotik)")), "socks5 list");
        assert_eq!(record.proxy_type(), ProxyType::Http);
        let record = normalize(raw(Some("SOCKS5 HTTPS")), "x");
        assert_eq!(record.proxy_type(), ProxyType::Socks5);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_source() {
        let record = normalize(raw(Some("transparent")), "socks4 dump");
        assert_eq!(record.proxy_type(), ProxyType::Socks4);
        let record = normalize(raw(Some("???")), "Spys.One");
        assert_eq!(record.proxy_type(), ProxyType::Http);
    }

    #[test]
    fn test_optional_fields_pass_through() {
        let input = raw(Some("http"))
            .with_country(Some("United States"))
            .with_anonymity(Some("elite proxy"));
        let record = normalize(input, "x");
        assert_eq!(record.country(), Some("United States"));
        assert_eq!(record.anonymity(), Some("elite proxy"));
        assert_eq!(record.address(), "10.0.0.1");
        assert_eq!(record.port(), 8080);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            raw(Some("SOCKS5")).with_country(Some("DE")),
            raw(Some("https")).with_anonymity(Some("anonymous")),
            raw(Some("http")),
        ];
        for input in inputs {
            let once = normalize(input, "HTTPS source");
            let twice = normalize(RawRecord::from(once.clone()), "HTTPS source");
            assert_eq!(once, twice);
        }
    }
}
