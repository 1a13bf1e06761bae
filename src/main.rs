use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use proxy_harvest::{
    builtin_sources, read_file, Aggregator, Config, FetchConfig, HttpFetcher, OutputFormat, OutputWriter,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A proxy list aggregator for public proxy sources
#[derive(Parser)]
#[command(name = "proxy-harvest", version)]
#[command(about = "Collects public proxy lists and saves them grouped by proxy type")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory output files are written to and read from
    #[arg(short, long, global = true, env = "PROXY_HARVEST_OUTPUT", default_value = "./lists")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in sources
    Sources,
    /// Collect proxies and save them grouped by type
    Collect {
        /// Source to collect from (can specify multiple; default: all)
        #[arg(short, long)]
        source: Vec<String>,
        /// Output format (txt, json)
        #[arg(short, long, env = "PROXY_HARVEST_FORMAT", default_value = "txt")]
        format: OutputFormat,
        /// Timeout in seconds for each HTTP request
        #[arg(long, env = "PROXY_HARVEST_TIMEOUT", default_value = "15")]
        timeout: u64,
        /// Attempts per URL before giving up
        #[arg(long, env = "PROXY_HARVEST_RETRIES", default_value = "3")]
        retries: u32,
        /// Pause between attempts in milliseconds
        #[arg(long, env = "PROXY_HARVEST_RETRY_DELAY_MS", default_value = "1000")]
        retry_delay_ms: u64,
    },
    /// Show collected proxies from the output directory
    Show {
        /// Number of proxies to print per file
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("proxy_harvest=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            let sources = builtin_sources();
            for source in &sources {
                println!(
                    "{} ({}, {} endpoint(s))",
                    source.name,
                    source.kind.label(),
                    source.kind.urls().len()
                );
            }
            println!("\n{} sources", sources.len());
        }
        Commands::Collect {
            source,
            format,
            timeout,
            retries,
            retry_delay_ms,
        } => {
            let config = Config {
                output_dir: cli.output,
                format,
                fetch: FetchConfig::new()
                    .with_timeout(Duration::from_secs(timeout))
                    .with_max_retries(retries)
                    .with_retry_delay(Duration::from_millis(retry_delay_ms)),
            };
            collect(&config, &source).await?;
        }
        Commands::Show { limit } => {
            show(&OutputWriter::new(&cli.output), limit)?;
        }
    }

    Ok(())
}

async fn collect(config: &Config, sources: &[String]) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::with_config(config.fetch.clone())?);
    let aggregator = Aggregator::with_builtin_sources(fetcher);
    let writer = OutputWriter::new(&config.output_dir);

    let run = if sources.is_empty() {
        aggregator.run_all().await
    } else {
        let known = aggregator.source_names();
        if let Some(unknown) = sources
            .iter()
            .find(|s| !known.iter().any(|k| k.eq_ignore_ascii_case(s)))
        {
            return Err(anyhow!(
                "Unknown source: {}. Use one of: {}",
                unknown,
                known.join(", ")
            ));
        }
        aggregator.run_selected(sources).await
    };

    let mut total = 0;
    for (result, written) in writer.write_run(&run, config.format) {
        match written {
            Ok(written) => {
                total += written.total();
                println!(
                    "✓ {}: {} proxies ({} skipped, {} endpoint(s) failed)",
                    result.source,
                    result.len(),
                    result.skipped,
                    result.failed_endpoints
                );
                for file in &written.files {
                    println!("    {} {:?} ({})", file.proxy_type, file.path, file.count);
                }
            }
            Err(error) => println!("✗ {}: could not save: {:#}", result.source, error),
        }
    }
    for result in run.failures() {
        if let Some(error) = &result.error {
            println!("✗ {}: {}", result.source, error);
        }
    }

    println!("\nTotal proxies: {}", total);
    Ok(())
}

fn show(writer: &OutputWriter, limit: usize) -> Result<()> {
    let paths = writer.list_outputs()?;
    if paths.is_empty() {
        println!("No proxies collected yet in {:?}", writer.output_dir());
        return Ok(());
    }

    for path in paths {
        let records = read_file(&path)?;
        println!("{:?} - {} proxies", path, records.len());
        for record in records.iter().take(limit) {
            println!(
                "  {} ({}) - {}",
                record.to_simple_string(),
                record.proxy_type(),
                record.country().unwrap_or("N/A")
            );
        }
        if records.len() > limit {
            println!("  ... and {} more", records.len() - limit);
        }
        println!();
    }
    Ok(())
}
