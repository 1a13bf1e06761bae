//! Source adapters
//!
//! A [`Source`] is plain data: a name plus an [`AdapterKind`] describing
//! where the listing lives and how its rows map onto [`RawRecord`]s.
//! Every structural assumption (selectors, column indices, JSON keys) sits
//! in a layout value so a new source is a new constant, not new code.

use crate::error::AdapterError;
use crate::proxy::fetcher::Fetch;
use crate::proxy::models::{ProxyType, RawRecord};
use crate::proxy::parser::{Parsed, ProxyParser};
use futures::future::BoxFuture;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

/// What one adapter run produced, before normalization
#[derive(Debug, Default)]
pub struct Scrape {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
    pub failed_endpoints: usize,
    pub error: Option<AdapterError>,
}

impl Scrape {
    pub fn failed(error: AdapterError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Anything that can produce raw records for a named source
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;

    fn scrape<'a>(&'a self, fetcher: &'a dyn Fetch) -> BoxFuture<'a, Scrape>;
}

/// A plain-list URL and the proxy type it serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub url: &'static str,
    pub proxy_type: ProxyType,
}

/// How the ip cell of a table row is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpCell {
    Plain,
    /// `ip:port` in one cell; only the host part is kept
    HostPort,
}

/// Where a table row says what kind of proxy it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeColumn {
    /// Free-text tag such as `HTTP` or `SOCKS5`
    Tag(usize),
    /// `yes`/`no` HTTPS support flag
    HttpsFlag(usize),
}

/// Column mapping for an HTML table source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// CSS selector for the table; the first match is used
    pub table: &'static str,
    pub header_rows: usize,
    pub min_columns: usize,
    pub ip: usize,
    pub ip_cell: IpCell,
    pub port: usize,
    pub proxy_type: TypeColumn,
    pub country: Option<usize>,
    pub anonymity: Option<usize>,
}

impl TableLayout {
    /// Extract rows from a document; fails only if the table is missing
    pub fn parse(&self, html: &str) -> Result<Parsed, AdapterError> {
        let table_selector = selector(self.table)?;
        let row_selector = selector("tr")?;
        let cell_selector = selector("td")?;

        let document = Html::parse_document(html);
        let table = document
            .select(&table_selector)
            .next()
            .ok_or(AdapterError::MissingTable(self.table))?;

        let mut parsed = Parsed::default();
        for row in table.select(&row_selector).skip(self.header_rows) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            parsed.push(self.extract(&cells));
        }
        Ok(parsed)
    }

    fn extract(&self, cells: &[String]) -> Option<RawRecord> {
        if cells.len() < self.min_columns {
            return None;
        }
        let cell = |index: Option<usize>| index.and_then(|i| cells.get(i)).map(String::as_str);

        let ip = cells.get(self.ip)?;
        let host = match self.ip_cell {
            IpCell::Plain => ip.as_str(),
            IpCell::HostPort => ip.split(':').next()?,
        };
        let tag = match self.proxy_type {
            TypeColumn::Tag(i) => cell(Some(i)),
            TypeColumn::HttpsFlag(i) => match cell(Some(i)) {
                Some(flag) if flag.eq_ignore_ascii_case("yes") => Some("https"),
                _ => Some("http"),
            },
        };

        Some(
            RawRecord::new(host, cells.get(self.port)?)?
                .with_type(tag)
                .with_country(cell(self.country))
                .with_anonymity(cell(self.anonymity)),
        )
    }
}

fn selector(css: &'static str) -> Result<Selector, AdapterError> {
    Selector::parse(css).map_err(|e| AdapterError::InvalidSelector {
        selector: css,
        reason: format!("{e:?}"),
    })
}

/// Key mapping for a JSON API source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLayout {
    /// Top-level field holding the array of entries
    pub array: &'static str,
    pub ip: &'static str,
    pub port: &'static str,
    pub proxy_type: Option<&'static str>,
    pub country: Option<&'static str>,
    pub anonymity: Option<&'static str>,
}

impl JsonLayout {
    /// Extract entries; fails if the payload is not JSON or the array is missing
    pub fn parse(&self, body: &str) -> Result<Parsed, AdapterError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| AdapterError::InvalidJson(e.to_string()))?;
        let entries = value
            .get(self.array)
            .and_then(Value::as_array)
            .ok_or(AdapterError::MissingField(self.array))?;

        let mut parsed = Parsed::default();
        for entry in entries {
            parsed.push(self.extract(entry));
        }
        Ok(parsed)
    }

    fn extract(&self, entry: &Value) -> Option<RawRecord> {
        let field = |key: Option<&str>| key.and_then(|k| entry.get(k)).and_then(scalar_text);

        let ip = field(Some(self.ip))?;
        let port = field(Some(self.port))?;
        Some(
            RawRecord::new(&ip, &port)?
                .with_type(field(self.proxy_type).as_deref())
                .with_country(field(self.country).as_deref())
                .with_anonymity(field(self.anonymity).as_deref()),
        )
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parsing strategy of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// One or more `ip:port` lists, each serving a known type
    PlainList(&'static [Endpoint]),
    HtmlTable {
        url: &'static str,
        layout: TableLayout,
    },
    JsonApi {
        url: &'static str,
        layout: JsonLayout,
    },
}

impl AdapterKind {
    /// URLs to fetch, with the type each one declares
    pub fn urls(&self) -> Vec<(&'static str, Option<ProxyType>)> {
        match self {
            AdapterKind::PlainList(endpoints) => endpoints
                .iter()
                .map(|e| (e.url, Some(e.proxy_type)))
                .collect(),
            AdapterKind::HtmlTable { url, .. } | AdapterKind::JsonApi { url, .. } => {
                vec![(*url, None)]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdapterKind::PlainList(_) => "plain list",
            AdapterKind::HtmlTable { .. } => "html table",
            AdapterKind::JsonApi { .. } => "json api",
        }
    }

    fn parse(&self, body: &str, declared: Option<ProxyType>) -> Result<Parsed, AdapterError> {
        match self {
            AdapterKind::PlainList(_) => Ok(ProxyParser::parse_plain_list(
                body,
                declared.unwrap_or_default(),
            )),
            AdapterKind::HtmlTable { layout, .. } => layout.parse(body),
            AdapterKind::JsonApi { layout, .. } => layout.parse(body),
        }
    }
}

/// A named upstream source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub name: &'static str,
    pub kind: AdapterKind,
}

impl Source {
    async fn run(&self, fetcher: &dyn Fetch) -> Scrape {
        let urls = self.kind.urls();
        let mut scrape = Scrape::default();

        for (url, declared) in &urls {
            let body = match fetcher.fetch(url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(source = self.name, %url, error = %e, "endpoint dropped");
                    scrape.failed_endpoints += 1;
                    continue;
                }
            };

            match self.kind.parse(&body, *declared) {
                Ok(parsed) => {
                    debug!(
                        source = self.name,
                        %url,
                        records = parsed.records.len(),
                        skipped = parsed.skipped,
                        "parsed endpoint"
                    );
                    scrape.records.extend(parsed.records);
                    scrape.skipped += parsed.skipped;
                }
                Err(e) => return Scrape::failed(e),
            }
        }

        scrape
    }
}

impl Adapter for Source {
    fn name(&self) -> &str {
        self.name
    }

    fn scrape<'a>(&'a self, fetcher: &'a dyn Fetch) -> BoxFuture<'a, Scrape> {
        Box::pin(self.run(fetcher))
    }
}
