//! Image-Scraper main entry point
//!
//! This is the command-line interface for the Image-Scraper crawler.

use anyhow::Context;
use clap::Parser;
use image_scraper::config::{load_config, parse_seed_url, Config};
use image_scraper::{Downloader, Scraper};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Destination used when neither the command line nor the config names one
const DEFAULT_DEST_DIR: &str = "./data";

/// Image-Scraper: download every image of a website
///
/// Image-Scraper crawls all pages on the host of the given URL and downloads
/// every `<img src>` it finds into a flat destination directory.
#[derive(Parser, Debug)]
#[command(name = "image-scraper")]
#[command(version)]
#[command(about = "Download every image of a website", long_about = None)]
struct Cli {
    /// Website URL to be scraped
    #[arg(long, value_name = "URL")]
    url: String,

    /// Destination directory for downloaded images
    /// [default: the config file's dest-dir, else ./data]
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

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

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).context("unable to load configuration")?
        }
        None => Config::default(),
    };
    config.downloader.dest_dir = Some(resolve_dest_dir(
        cli.dir.clone(),
        config.downloader.dest_dir.take(),
    ));

    let seed = parse_seed_url(&cli.url).context("invalid url")?;

    let downloader = Arc::new(
        Downloader::new(&config.downloader, &config.http).context("unable to create dir")?,
    );

    let mut scraper = Scraper::new(config.crawler.clone(), &config.http)?;
    let queue = Arc::clone(&downloader);
    scraper.on_html_element("img", move |element| {
        let Some(link) = element.absolute_attr("src") else {
            return;
        };
        tracing::info!(url = %link, "enqueueing");
        if let Err(e) = queue.queue_blocking(&link) {
            tracing::warn!(error = %e, "unable to enqueue download");
        }
    });

    let cancel = scraper.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let summary = scraper.scrape(&seed).await?;
    let stats = downloader.stop().await;

    tracing::info!(
        "Done: {} pages crawled ({} failed), {} images downloaded, {} skipped, {} failed",
        summary.pages_crawled,
        summary.pages_failed,
        stats.downloaded,
        stats.skipped,
        stats.failed
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_scraper=info,warn"),
            1 => EnvFilter::new("image_scraper=debug,info"),
            2 => EnvFilter::new("image_scraper=trace,debug"),
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

/// Picks the download directory: `--dir`, then the config file, then the default
fn resolve_dest_dir(cli_dir: Option<PathBuf>, configured: Option<PathBuf>) -> PathBuf {
    cli_dir
        .or(configured)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR))
}
