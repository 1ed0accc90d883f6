//! Image-Audit main entry point
//!
//! This is the command-line interface for the Image-Audit product card inspector.

use anyhow::Context;
use clap::{Parser, Subcommand};
use image_audit::config::{load_config_with_hash, Config};
use image_audit::crawler::{build_http_client, CrawlOrchestrator};
use image_audit::output::{
    format_report, latest_report, print_statistics, save_report, CrawlStatistics,
};
use image_audit::sitemap::SitemapResolver;
use image_audit::state::CrawlContext;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Image-Audit: find product cards with missing images
///
/// Image-Audit resolves XML sitemaps into page URLs, inspects every page
/// for product cards and reports the cards whose image is missing.
#[derive(Parser, Debug)]
#[command(name = "image-audit")]
#[command(version)]
#[command(about = "Find product cards with missing images", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the leaf sitemaps of a sitemap index
    Sitemaps {
        /// URL of the sitemap index
        #[arg(value_name = "INDEX_URL")]
        index_url: String,

        /// Return every sub-sitemap instead of only the allow-listed ones
        #[arg(long)]
        all: bool,
    },

    /// Inspect every page listed in the given leaf sitemaps
    Crawl {
        /// Leaf sitemap URLs, crawled in the order given
        #[arg(value_name = "SITEMAP_URL", required = true)]
        sitemaps: Vec<String>,

        /// Print the report to stdout instead of saving it
        #[arg(long)]
        stdout: bool,
    },

    /// Print the path of the most recent saved report
    Latest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Sitemaps { index_url, all } => handle_sitemaps(&config, &index_url, !all).await,
        Command::Crawl { sitemaps, stdout } => handle_crawl(&config, &sitemaps, stdout).await,
        Command::Latest => handle_latest(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so `crawl --stdout` output stays a clean CSV.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_audit=info,warn"),
            1 => EnvFilter::new("image_audit=debug,info"),
            2 => EnvFilter::new("image_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `sitemaps`: prints the leaf sitemaps of an index, one per line
async fn handle_sitemaps(config: &Config, index_url: &str, filter: bool) -> anyhow::Result<()> {
    let client = build_http_client(
        &config.http,
        Duration::from_secs(config.http.request_timeout_secs),
    )?;
    let resolver = SitemapResolver::new(client, config.sitemap.allow_list.clone());

    match resolver.resolve_sitemap_index(index_url, filter).await {
        Ok(sitemaps) => {
            for sitemap in sitemaps {
                println!("{}", sitemap);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error fetching sitemaps: {}", e);
            eprintln!("Failed to fetch sitemaps, please retry.");
            Err(e.into())
        }
    }
}

/// Handles `crawl`: runs the crawl with live progress and Ctrl-C cancellation
async fn handle_crawl(config: &Config, sitemaps: &[String], stdout: bool) -> anyhow::Result<()> {
    let orchestrator = CrawlOrchestrator::from_config(config)?;
    let ctx = CrawlContext::new(config.progress.channel_capacity);

    let mut progress = ctx.progress.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = progress.recv().await {
            eprintln!("{}", event);
        }
    });

    let cancel = ctx.cancel_handle();
    let signal = tokio::spawn(async move {
        let mut presses = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            match interrupt_action(presses) {
                InterruptAction::Cancel => {
                    eprintln!("Cancel requested, finishing the current page...");
                    eprintln!("Press Ctrl-C again to abort immediately.");
                    cancel.request_cancel();
                }
                InterruptAction::Abort => {
                    eprintln!("Aborted.");
                    std::process::exit(130);
                }
            }
        }
    });

    let run = orchestrator.crawl(sitemaps, &ctx).await;

    // The crawl closes the stream on its final event; this covers early exits
    ctx.progress.unsubscribe();
    signal.abort();
    if let Err(e) = printer.await {
        tracing::warn!("Progress printer ended abnormally: {}", e);
    }

    if run.cancelled {
        println!("Scraping canceled.");
        return Ok(());
    }

    let csv = match format_report(&run.results) {
        Ok(csv) => csv,
        Err(e) => {
            tracing::error!("Error during scraping: {}", e);
            eprintln!("Scraping failed, please retry.");
            return Err(e.into());
        }
    };

    if stdout {
        print!("{}", csv);
        return Ok(());
    }

    let path = save_report(Path::new(&config.output.report_dir), &csv)
        .context("failed to save report")?;
    println!("Report saved to: {}\n", path.display());
    print_statistics(&CrawlStatistics::from_run(&run));

    Ok(())
}

/// What a Ctrl-C press does during a crawl
#[derive(Debug, PartialEq, Eq)]
enum InterruptAction {
    /// Stop before the next page
    Cancel,
    /// Exit without waiting for the current page
    Abort,
}

fn interrupt_action(presses: u32) -> InterruptAction {
    if presses <= 1 {
        InterruptAction::Cancel
    } else {
        InterruptAction::Abort
    }
}

/// Handles `latest`: prints the newest report path
fn handle_latest(config: &Config) -> anyhow::Result<()> {
    let dir = Path::new(&config.output.report_dir);
    match latest_report(dir)? {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!("No CSV file found in {}", dir.display()),
    }
}
