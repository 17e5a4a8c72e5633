//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift batch harvester.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sumi_sift::config::{load_config, load_url_list, validate, validate_target_url, Config};
use sumi_sift::extract::Article;
use sumi_sift::output::{ConsoleSink, JsonFileSink, ResultSink};
use sumi_sift::pipeline::{BatchOutcome, Coordinator};
use sumi_sift::ArticleExtractor;
use tracing_subscriber::EnvFilter;

/// Public pages used by `--demo`
const DEMO_URLS: &[&str] = &[
    "https://news.ycombinator.com",
    "https://www.reddit.com/r/programming",
    "https://www.techcrunch.com",
];

/// Sumi-Sift: a paced batch page harvester
///
/// Sumi-Sift fetches a fixed list of pages concurrently under one global
/// request rate, retries failures with exponential backoff, and extracts
/// title, author, date, and summary from every page.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version)]
#[command(about = "A paced batch page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL to harvest (repeatable)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// File with one URL per line
    #[arg(long, value_name = "PATH")]
    urls_file: Option<PathBuf>,

    /// Harvest the built-in demo URL list
    #[arg(long)]
    demo: bool,

    /// Global request rate (requests per second)
    #[arg(long, value_name = "RPS")]
    rate: Option<f64>,

    /// Timeout for each attempt, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Attempts per URL
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Write the JSON report to this path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Do not print articles and statistics to stdout
    #[arg(long)]
    no_summary: bool,

    /// Cancel the whole batch after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Validate config and list the URLs without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let urls = collect_urls(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &urls);
        return Ok(());
    }

    let coordinator = Coordinator::from_config(&config, ArticleExtractor)
        .context("Failed to initialize harvester")?;

    let outcome = run_until_cancelled(&coordinator, &urls, cli.deadline).await?;

    write_outputs(&config, &outcome)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(rate) = cli.rate {
        config.scraper.requests_per_second = rate;
    }
    if let Some(timeout) = cli.timeout {
        config.scraper.timeout_seconds = timeout;
    }
    if let Some(max_retries) = cli.max_retries {
        config.scraper.max_retries = max_retries;
    }
    if let Some(output) = &cli.output {
        config.output.json_path = Some(output.display().to_string());
    }
    if cli.no_summary || cli.quiet {
        config.output.print_summary = false;
    }

    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

/// Gathers URLs from the config, URL files, flags, and the demo list
fn collect_urls(cli: &Cli, config: &Config) -> anyhow::Result<Vec<String>> {
    let mut urls = config.input.urls.clone();

    if let Some(path) = &config.input.urls_file {
        urls.extend(read_url_file(Path::new(path))?);
    }
    if let Some(path) = &cli.urls_file {
        urls.extend(read_url_file(path)?);
    }

    urls.extend(cli.urls.iter().cloned());

    if cli.demo {
        urls.extend(DEMO_URLS.iter().map(|u| u.to_string()));
    }

    for url in &urls {
        validate_target_url(url)?;
    }

    if urls.is_empty() {
        tracing::warn!("No URLs given; the batch will be empty");
    }

    Ok(urls)
}

fn read_url_file(path: &Path) -> anyhow::Result<Vec<String>> {
    load_url_list(path).with_context(|| format!("Failed to read URL list {}", path.display()))
}

/// Handles the --dry-run mode: shows what would be fetched
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Sumi-Sift Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Rate limit: {} req/s", config.scraper.requests_per_second);
    println!("  Timeout: {}s per attempt", config.scraper.timeout_seconds);
    println!("  Attempts per URL: {}", config.scraper.max_retries);
    println!("  Backoff unit: {}ms", config.scraper.backoff_unit_ms);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    match &config.output.json_path {
        Some(path) => println!("  JSON report: {}", path),
        None => println!("  JSON report: (none)"),
    }

    println!("\nURLs ({}):", urls.len());
    for url in urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Runs the batch, cancelling it on Ctrl-C or when the deadline passes
async fn run_until_cancelled(
    coordinator: &Coordinator<ArticleExtractor>,
    urls: &[String],
    deadline: Option<u64>,
) -> anyhow::Result<BatchOutcome<Article>> {
    let batch = coordinator.run(urls);

    let limited = async {
        match deadline {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), batch)
                .await
                .ok(),
            None => Some(batch.await),
        }
    };

    tokio::select! {
        outcome = limited => match outcome {
            Some(outcome) => Ok(outcome),
            None => bail!("Batch cancelled: deadline of {}s exceeded", deadline.unwrap_or_default()),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, cancelling in-flight requests");
            bail!("Batch cancelled by user")
        }
    }
}

/// Hands the batch result to the configured sinks
fn write_outputs(config: &Config, outcome: &BatchOutcome<Article>) -> anyhow::Result<()> {
    if config.output.print_summary {
        ConsoleSink.accept(outcome.records.as_slice(), &outcome.statistics)?;
    }

    if let Some(path) = &config.output.json_path {
        JsonFileSink::new(path)
            .accept(outcome.records.as_slice(), &outcome.statistics)
            .with_context(|| format!("Failed to write report to {}", path))?;
        if config.output.print_summary {
            println!("\n✓ Results saved to '{}'", path);
        }
    }

    Ok(())
}
