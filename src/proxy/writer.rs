//! Persists records grouped by proxy type, one file per (source, type)

use crate::error::ParseError;
use crate::proxy::aggregator::AggregationRun;
use crate::proxy::models::{ProxyRecord, ProxyType, SourceResult};
use crate::proxy::parser::ProxyParser;
use crate::Result;
use anyhow::Context;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Default directory for output files
pub const DEFAULT_OUTPUT_DIR: &str = "./lists";

/// Serialization format of output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ParseError::OutputFormat(s.to_string())),
        }
    }
}

/// One file written for a (source, type) group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub proxy_type: ProxyType,
    pub path: PathBuf,
    pub count: usize,
}

/// Files written for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub source: String,
    pub files: Vec<WrittenFile>,
}

impl WriteResult {
    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.count).sum()
    }
}

/// Replace characters that are unsafe or ambiguous in file names
pub fn sanitize_source_name(name: &str) -> String {
    name.replace([' ', '.', '/'], "_")
}

/// Render one txt output line
pub fn format_line(record: &ProxyRecord) -> String {
    let mut line = record.url();

    let metadata: Vec<String> = [
        ("country", record.country()),
        ("anon", record.anonymity()),
        ("src", Some(record.source())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
    .collect();

    if !metadata.is_empty() {
        line.push_str("  # ");
        line.push_str(&metadata.join(" "));
    }
    line
}

/// Writes grouped output files under a fixed directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the file holding `proxy_type` records of `source`
    pub fn path_for(&self, source: &str, proxy_type: ProxyType, format: OutputFormat) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            sanitize_source_name(source),
            proxy_type,
            format.extension()
        ))
    }

    /// Write `records` partitioned by type, overwriting previous files.
    ///
    /// When at least one record is written, files of the same format left by
    /// an earlier run for types this source no longer serves are removed.
    pub fn write(
        &self,
        records: &[ProxyRecord],
        source: &str,
        format: OutputFormat,
    ) -> Result<WriteResult> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {:?}", self.output_dir)
        })?;

        let mut groups: BTreeMap<ProxyType, Vec<&ProxyRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.proxy_type()).or_default().push(record);
        }

        let mut files = Vec::with_capacity(groups.len());
        for (proxy_type, group) in groups {
            let path = self.path_for(source, proxy_type, format);
            let content = match format {
                OutputFormat::Txt => group
                    .iter()
                    .map(|r| format_line(r) + "\n")
                    .collect::<String>(),
                OutputFormat::Json => serde_json::to_string_pretty(&group)?,
            };
            fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

            info!(%source, %proxy_type, count = group.len(), path = ?path, "wrote proxies");
            files.push(WrittenFile {
                proxy_type,
                path,
                count: group.len(),
            });
        }

        if !files.is_empty() {
            self.remove_stale(source, &files, format)?;
        }

        Ok(WriteResult {
            source: source.to_string(),
            files,
        })
    }

    fn remove_stale(&self, source: &str, kept: &[WrittenFile], format: OutputFormat) -> Result<()> {
        for proxy_type in ProxyType::ALL {
            if kept.iter().any(|f| f.proxy_type == proxy_type) {
                continue;
            }
            let path = self.path_for(source, proxy_type, format);
            if path.is_file() {
                fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
                info!(%source, %proxy_type, path = ?path, "removed stale list");
            }
        }
        Ok(())
    }

    /// Write every successful source of a run, in run order.
    ///
    /// Failed sources are skipped. A write failure is logged and reported for
    /// its source only; the remaining sources are still written.
    pub fn write_run<'a>(
        &self,
        run: &'a AggregationRun,
        format: OutputFormat,
    ) -> Vec<(&'a SourceResult, Result<WriteResult>)> {
        run.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| {
                let written = self.write(&r.records, &r.source, format);
                if let Err(e) = &written {
                    warn!(source = %r.source, error = %e, "failed to write proxies");
                }
                (r, written)
            })
            .collect()
    }

    /// Output files currently present, sorted by name
    pub fn list_outputs(&self) -> Result<Vec<PathBuf>> {
        if !self.output_dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.output_dir)
            .with_context(|| format!("Failed to read {:?}", self.output_dir))?
        {
            let path = entry?.path();
            let known = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.parse::<OutputFormat>().is_ok());
            if path.is_file() && known {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Load a txt or json output file back into records
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<ProxyRecord>> {
    let path = path.as_ref();
    let format: OutputFormat = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .parse()?;
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    match format {
        OutputFormat::Txt => {
            let fallback = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            Ok(ProxyParser::parse_output(&content, fallback))
        }
        OutputFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path)),
    }
}
