//! Resource downloader backed by a [`WorkPool`]
//!
//! Every queued URL becomes one pool task that fetches the resource and writes
//! it to `<dest_dir>/<last path segment>`. Existing files are never
//! overwritten: the first download of a name wins and later ones are skipped.
//! Failures are logged per URL and never stop the batch.

use crate::config::{
    validate_downloader_config, validate_http_config, DownloaderConfig, HttpConfig,
};
use crate::crawler::build_http_client;
use crate::pool::{PoolError, Task, TaskError, WorkPool};
use crate::url::file_name_from_url;
use crate::ScrapeError;
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Download totals reported by [`Downloader::stop`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Files written
    pub downloaded: usize,
    /// URLs whose destination file already existed
    pub skipped: usize,
    /// URLs that failed
    pub failed: usize,
}

#[derive(Debug, Default)]
struct Counters {
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> DownloadStats {
        DownloadStats {
            downloaded: self.downloaded.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Fixed-concurrency fetch-and-write executor
pub struct Downloader {
    pool: WorkPool<ScrapeError>,
    client: Client,
    dest_dir: PathBuf,
    counters: Arc<Counters>,
}

impl Downloader {
    /// Creates the destination directory and starts the download workers
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `config` - Worker count, queue capacity and destination directory.
    ///   Without a `dest_dir` a new temporary directory is created and kept,
    ///   see [`Downloader::dest_dir`]
    /// * `http` - Settings for the HTTP client resources are fetched with
    ///
    /// # Returns
    ///
    /// A running downloader ready for [`Downloader::queue`]
    ///
    /// # Errors
    ///
    /// * `ScrapeError::Config` - either configuration section is invalid
    /// * `ScrapeError::Io` - the destination directory could not be created
    /// * `ScrapeError::Reqwest` - the HTTP client could not be built
    pub fn new(config: &DownloaderConfig, http: &HttpConfig) -> Result<Self, ScrapeError> {
        validate_downloader_config(config)?;
        validate_http_config(http)?;

        let dest_dir = match &config.dest_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => tempfile::Builder::new()
                .prefix("downloader")
                .tempdir()?
                .keep(),
        };

        let client = build_http_client(http)?;
        let counters = Arc::new(Counters::default());

        let failures = Arc::clone(&counters);
        let pool = WorkPool::new(
            config.concurrency,
            config.queue_capacity,
            move |url: &str, error: TaskError<ScrapeError>| {
                failures.failed.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(url, error = %error, "unable to download");
            },
        );
        pool.start();

        tracing::info!(
            dest_dir = %dest_dir.display(),
            workers = pool.concurrency(),
            "downloader started"
        );

        Ok(Self {
            pool,
            client,
            dest_dir,
            counters,
        })
    }

    /// Directory downloads are written to
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Queues `url` for download, waiting while the queue is full
    pub async fn queue(&self, url: &str) -> Result<(), PoolError> {
        self.pool.submit(self.task(url)).await
    }

    /// Queues `url` from synchronous code such as an element callback
    ///
    /// Blocks the calling thread while the queue is full. Panics if called
    /// from async code; use [`Downloader::queue`] there.
    pub fn queue_blocking(&self, url: &str) -> Result<(), PoolError> {
        self.pool.blocking_submit(self.task(url))
    }

    /// Waits for every queued download to finish and returns the totals
    pub async fn stop(&self) -> DownloadStats {
        self.pool.stop().await;

        let stats = self.counters.snapshot();
        tracing::info!(
            downloaded = stats.downloaded,
            skipped = stats.skipped,
            failed = stats.failed,
            "downloader stopped"
        );
        stats
    }

    fn task(&self, url: &str) -> Task<ScrapeError> {
        let url = url.to_string();
        let client = self.client.clone();
        let dest_dir = self.dest_dir.clone();
        let counters = Arc::clone(&self.counters);

        Task::new(url.clone(), async move {
            download(&client, &dest_dir, &url, &counters).await
        })
    }
}

/// Downloads one resource into `dest_dir`
async fn download(
    client: &Client,
    dest_dir: &Path,
    url: &str,
    counters: &Counters,
) -> Result<(), ScrapeError> {
    let file_name = file_name_from_url(url)?;
    let path = dest_dir.join(file_name);

    // create_new makes the existence check and the claim on the name atomic
    let file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::debug!(url, path = %path.display(), "file exists, skipping");
            counters.skipped.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }
        Err(source) => return Err(ScrapeError::Write { path, source }),
    };

    if let Err(e) = fetch_into(client, url, &path, file).await {
        // A partial file would make later attempts look complete
        if let Err(cleanup) = tokio::fs::remove_file(&path).await {
            tracing::debug!(path = %path.display(), error = %cleanup, "could not remove partial file");
        }
        return Err(e);
    }

    tracing::debug!(url, path = %path.display(), "downloaded");
    counters.downloaded.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

/// Streams the response body for `url` into `file`
async fn fetch_into(
    client: &Client,
    url: &str,
    path: &Path,
    mut file: File,
) -> Result<(), ScrapeError> {
    let http_error = |source: reqwest::Error| ScrapeError::Http {
        url: url.to_string(),
        source,
    };
    let write_error = |source: std::io::Error| ScrapeError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut response = client.get(url).send().await.map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    while let Some(chunk) = response.chunk().await.map_err(http_error)? {
        file.write_all(&chunk).await.map_err(write_error)?;
    }
    file.flush().await.map_err(write_error)?;

    Ok(())
}
