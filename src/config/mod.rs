//! Configuration module for Image-Scraper
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus checking the seed URL given on the command line.
//!
//! # Example
//!
//! ```no_run
//! use image_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Download workers: {}", config.downloader.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DownloaderConfig, HttpConfig, DEFAULT_CRAWL_CONCURRENCY,
    DEFAULT_DOWNLOAD_CONCURRENCY, DEFAULT_INBOX_CAPACITY,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{
    parse_seed_url, validate, validate_crawler_config, validate_downloader_config,
    validate_http_config,
};
