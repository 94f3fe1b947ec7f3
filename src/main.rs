//! Sumi-Sieve main entry point
//!
//! This is the command-line interface for the Sumi-Sieve crawl decision core.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_sieve::config::{load_config_with_hash, Config};
use sumi_sieve::crawler::{CrawlSession, Fetcher, HtmlParser, HttpFetcher};
use sumi_sieve::output::{
    format_report, load_latest_report, ReportSink, SqliteReportSink, TextReportSink,
};
use sumi_sieve::Admission;
use tracing_subscriber::EnvFilter;

/// Sumi-Sieve: the decision core of a polite, trap-avoiding crawler
///
/// Given seed URLs, Sumi-Sieve checks each one against scope, robots.txt and
/// trap heuristics, fetches the admitted ones, filters their content, and
/// prints the outbound links worth following. Crawl statistics are written
/// to a report at the end.
#[derive(Parser, Debug)]
#[command(name = "sumi-sieve")]
#[command(version = "1.0.0")]
#[command(about = "The decision core of a polite, trap-avoiding crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URLs to check or process
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the crawl scope without fetching anything
    #[arg(long, conflicts_with_all = ["check", "stats"])]
    dry_run: bool,

    /// Run only the admissibility filter on each URL and print the decision
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    check: bool,

    /// Show the latest report stored in the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "check"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.urls);
    } else if cli.check {
        handle_check(&config, &cli.urls).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, &cli.urls).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sieve=info,warn"),
            1 => EnvFilter::new("sumi_sieve=debug,info"),
            2 => EnvFilter::new("sumi_sieve=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Sumi-Sieve Dry Run ===\n");

    println!("User Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);

    println!("\nAllowed Domains ({}):", config.scope.allowed_domains.len());
    for domain in &config.scope.allowed_domains {
        println!("  - {}", domain);
    }

    println!("\nExcluded Hosts ({}):", config.scope.excluded_hosts.len());
    for host in &config.scope.excluded_hosts {
        println!("  - {}", host);
    }

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);
    if let Some(database) = &config.output.database_path {
        println!("  Database: {}", database);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} URLs", urls.len());
}

/// Handles the --check mode: admissibility decision per URL, no page fetches
async fn handle_check(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let session = CrawlSession::from_config(config)?;

    for url in urls {
        match session.admit(url).await {
            Ok(Admission::Admitted) => println!("ADMIT   {}", url),
            Ok(Admission::Rejected(reason)) => println!("REJECT  {} ({})", url, reason),
            Err(e) => println!("INVALID {} ({})", url, e),
        }
    }

    Ok(())
}

/// Handles the --stats mode: prints the latest stored report
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let database = config
        .output
        .database_path
        .as_deref()
        .context("--stats needs [output] database-path in the configuration")?;

    println!("Database: {}\n", database);
    match load_latest_report(Path::new(database))? {
        Some(stored) => {
            println!(
                "Report {} generated at {}\n",
                stored.id,
                stored.generated_at.to_rfc3339()
            );
            print!("{}", format_report(&stored.report));
        }
        None => println!("No reports stored yet"),
    }

    Ok(())
}

/// Handles the main mode: admit, fetch and scrape each URL, then report
async fn handle_crawl(config: &Config, config_hash: &str, urls: &[String]) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent, &config.fetch)?);
    let session = CrawlSession::new(&config.scope, fetcher.clone(), Arc::new(HtmlParser));

    tracing::info!("Processing {} URLs", urls.len());

    for url in urls {
        match session.admit(url).await {
            Ok(Admission::Admitted) => {}
            Ok(Admission::Rejected(reason)) => {
                tracing::warn!("Not fetching {}: {}", url, reason);
                continue;
            }
            Err(e) => {
                tracing::warn!("Not fetching {}: {}", url, e);
                continue;
            }
        }

        let response = match fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                continue;
            }
        };

        for link in session.scrape(&response).await {
            println!("{}", link);
        }
    }

    let mut sinks: Vec<Box<dyn ReportSink>> =
        vec![Box::new(TextReportSink::new(&config.output.report_path))];
    if let Some(database) = &config.output.database_path {
        sinks.push(Box::new(
            SqliteReportSink::new(database).with_config_hash(config_hash),
        ));
    }

    let report = session
        .finish(&sinks)
        .context("Failed to write crawl report")?;
    tracing::info!(
        "Crawl completed: {} unique pages written to {}",
        report.unique_pages,
        config.output.report_path
    );

    Ok(())
}
