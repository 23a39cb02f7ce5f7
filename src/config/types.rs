use serde::Deserialize;
use std::path::PathBuf;

/// Default number of concurrent crawl workers
pub const DEFAULT_CRAWL_CONCURRENCY: usize = 10;

/// Default capacity of the coordinator's inbox
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Default number of concurrent downloads
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 10;

/// Main configuration structure for Image-Scraper
///
/// Every section and key is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub downloader: DownloaderConfig,
    pub http: HttpConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch/parse workers (0 = available parallelism)
    pub concurrency: usize,

    /// Capacity of the channel workers use to report back to the coordinator
    #[serde(rename = "inbox-capacity")]
    pub inbox_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CRAWL_CONCURRENCY,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

/// Downloader configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Number of concurrent downloads (0 = available parallelism)
    pub concurrency: usize,

    /// Number of queued downloads before submitters block
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// Destination directory; a temporary directory is used when unset
    #[serde(rename = "dest-dir")]
    pub dest_dir: Option<PathBuf>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            queue_capacity: crate::pool::DEFAULT_QUEUE_CAPACITY,
            dest_dir: None,
        }
    }
}

/// HTTP client settings shared by the crawler and the downloader
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("image-scraper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}
