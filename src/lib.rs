//! Image-Scraper: a single-site crawler that collects page resources
//!
//! This crate crawls one website breadth-first from a seed URL, hands every
//! parsed element to user-registered callbacks, and downloads the resources
//! those callbacks queue through a bounded worker pool.

pub mod config;
pub mod crawler;
pub mod downloader;
pub mod pool;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Image-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Document walk failed for {url}: {message}")]
    Walk { url: String, message: String },

    #[error("Cannot resolve {reference:?} against {base}: {source}")]
    Resolve {
        base: String,
        reference: String,
        source: ::url::ParseError,
    },

    #[error("Invalid filename derived from {url}")]
    InvalidFilename { url: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Image-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSummary, Element, Scraper};
pub use downloader::{DownloadStats, Downloader};
pub use pool::{PoolError, Task, TaskError, WorkPool};
