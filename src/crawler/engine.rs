//! The crawl engine's public entry point

use crate::config::{validate_crawler_config, validate_http_config, CrawlerConfig, HttpConfig};
use crate::crawler::coordinator::{Coordinator, CrawlSummary};
use crate::crawler::document::Element;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::registry::CallbackRegistry;
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::url::DomainScope;
use crate::ScrapeError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Breadth-first, single-host crawler with per-tag element callbacks
///
/// # Example
///
/// ```no_run
/// use image_scraper::config::{CrawlerConfig, HttpConfig};
/// use image_scraper::crawler::Scraper;
/// use url::Url;
///
/// # async fn example() -> Result<(), image_scraper::ScrapeError> {
/// let mut scraper = Scraper::new(CrawlerConfig::default(), &HttpConfig::default())?;
/// scraper.on_html_element("img", |element| {
///     if let Some(src) = element.absolute_attr("src") {
///         println!("found image: {}", src);
///     }
/// });
///
/// let summary = scraper.scrape(&Url::parse("https://example.com/")?).await?;
/// println!("crawled {} pages", summary.pages_crawled);
/// # Ok(())
/// # }
/// ```
pub struct Scraper {
    config: CrawlerConfig,
    fetcher: Fetcher,
    callbacks: CallbackRegistry,
    cancel: CancellationToken,
}

impl Scraper {
    /// Creates a scraper with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - Worker count and inbox capacity for each crawl
    /// * `http` - Settings for the HTTP client pages are fetched with
    ///
    /// # Returns
    ///
    /// A scraper with no callbacks registered
    ///
    /// # Errors
    ///
    /// * `ScrapeError::Config` - either configuration section is invalid
    /// * `ScrapeError::Reqwest` - the HTTP client could not be built
    pub fn new(config: CrawlerConfig, http: &HttpConfig) -> Result<Self, ScrapeError> {
        validate_crawler_config(&config)?;
        validate_http_config(http)?;
        Ok(Self::with_fetcher(config, Fetcher::from_config(http)?))
    }

    /// Creates a scraper that fetches through `fetcher`
    pub fn with_fetcher(config: CrawlerConfig, fetcher: Fetcher) -> Self {
        Self {
            config,
            fetcher,
            callbacks: CallbackRegistry::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Registers a callback for every element named `tag`
    ///
    /// Registering the same tag again replaces the earlier callback. Callbacks
    /// run on blocking threads, so they may block (for example on a full
    /// download queue).
    pub fn on_html_element<F>(&mut self, tag: &str, callback: F)
    where
        F: Fn(&Element<'_>) + Send + Sync + 'static,
    {
        self.callbacks.register(tag, callback);
    }

    /// Callbacks registered so far, by tag name
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Token that stops a running crawl when cancelled
    ///
    /// Pages being walked when the token fires skip their remaining elements,
    /// so no callback starts after cancellation. A callback that is already
    /// running finishes first. A cancelled token stays cancelled: later calls
    /// to [`Scraper::scrape`] return immediately.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn concurrency(&self) -> usize {
        if self.config.concurrency == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.config.concurrency
        }
    }

    /// Crawls every page reachable from `seed` on the seed's host
    ///
    /// Returns once no page is queued or being processed, or once the
    /// cancellation token fires. Per-page failures are logged and counted,
    /// never returned.
    ///
    /// # Errors
    ///
    /// * `ScrapeError::MissingHost` - the seed has no host to scope the crawl to
    pub async fn scrape(&self, seed: &Url) -> Result<CrawlSummary, ScrapeError> {
        let scope = DomainScope::from_seed(seed)?;
        let concurrency = self.concurrency();

        tracing::info!(
            seed = %seed,
            host = scope.host(),
            workers = concurrency,
            callbacks = ?self.callbacks,
            "starting crawl"
        );
        let start_time = std::time::Instant::now();

        let context = Arc::new(WorkerContext {
            fetcher: self.fetcher.clone(),
            scope,
            callbacks: Arc::new(self.callbacks.clone()),
            cancel: self.cancel.clone(),
        });

        let (work_tx, work_rx) = mpsc::channel(concurrency);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (inbox_tx, inbox_rx) = mpsc::channel(self.config.inbox_capacity.max(1));

        let mut workers = JoinSet::new();
        for id in 0..concurrency {
            workers.spawn(run_worker(
                id,
                Arc::clone(&context),
                Arc::clone(&work_rx),
                inbox_tx.clone(),
                self.cancel.clone(),
            ));
        }
        // Only workers hold inbox senders, so the inbox closes if they all exit
        drop(inbox_tx);

        let summary = Coordinator::new(seed.to_string())
            .run(work_tx, inbox_rx, self.cancel.clone())
            .await;

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "crawl worker exited abnormally");
            }
        }

        tracing::info!(
            pages_crawled = summary.pages_crawled,
            pages_failed = summary.pages_failed,
            urls_seen = summary.urls_seen,
            elapsed = ?start_time.elapsed(),
            "crawl finished"
        );

        Ok(summary)
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
