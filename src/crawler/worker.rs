//! Crawl workers
//!
//! Each worker takes URLs from the shared work channel, fetches the page,
//! walks it on a blocking thread (collecting same-host links and firing
//! element callbacks), and reports a [`PageOutcome`] back to the coordinator.
//! A failed page is reported like any other so the coordinator's in-flight
//! count always comes back down.

use crate::crawler::coordinator::PageOutcome;
use crate::crawler::document::Document;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::registry::CallbackRegistry;
use crate::url::DomainScope;
use crate::ScrapeError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Shared, read-only state every worker of one crawl uses
pub(crate) struct WorkerContext {
    pub fetcher: Fetcher,
    pub scope: DomainScope,
    pub callbacks: Arc<CallbackRegistry>,
    pub cancel: CancellationToken,
}

pub(crate) type WorkReceiver = Arc<Mutex<mpsc::Receiver<String>>>;

/// Worker loop: runs until the work channel closes or the crawl is cancelled
pub(crate) async fn run_worker(
    id: usize,
    context: Arc<WorkerContext>,
    work: WorkReceiver,
    inbox: mpsc::Sender<PageOutcome>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => None,
            url = async { work.lock().await.recv().await } => url,
        };
        let Some(url) = next else {
            break;
        };

        tracing::trace!(worker = id, url = %url, "processing");

        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = context.process(url) => outcome,
        };

        if inbox.send(outcome).await.is_err() {
            break;
        }
    }

    tracing::trace!(worker = id, "crawl worker exiting");
}

impl WorkerContext {
    /// Fetches and walks one page; never fails, failures become outcomes
    pub async fn process(&self, url: String) -> PageOutcome {
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "unable to load document");
                return PageOutcome::failed(url);
            }
        };

        let scope = self.scope.clone();
        let callbacks = Arc::clone(&self.callbacks);
        let cancel = self.cancel.clone();
        let walk =
            tokio::task::spawn_blocking(move || walk_page(page, &scope, &callbacks, &cancel));

        match walk.await {
            Ok(links) => PageOutcome::crawled(url, links),
            Err(e) => {
                // A panic here comes from an element callback
                let error = ScrapeError::Walk {
                    url: url.clone(),
                    message: e.to_string(),
                };
                tracing::warn!(error = %error, panicked = e.is_panic(), "document walk aborted");
                PageOutcome::failed(url)
            }
        }
    }
}

/// Parses a page and walks it in pre-order
///
/// For every element: an `a[href]` that resolves to a URL inside `scope` is
/// collected as a link, then the callback registered for the element's tag
/// (if any) is invoked. Callbacks fire regardless of scope. Once `cancel`
/// fires the rest of the document is skipped, so no callback runs after the
/// crawl has been cancelled.
pub(crate) fn walk_page(
    page: FetchedPage,
    scope: &DomainScope,
    callbacks: &CallbackRegistry,
    cancel: &CancellationToken,
) -> Vec<String> {
    let document = Document::parse(&page.body, page.final_url);
    let mut links = Vec::new();

    document.walk(|element| {
        if cancel.is_cancelled() {
            return;
        }

        if element.name() == "a" {
            if let Some(href) = element.attr("href") {
                match element.resolve_url(href) {
                    Ok(link) if scope.allows(&link) => links.push(String::from(link)),
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "skipping unresolvable link"),
                }
            }
        }

        if let Some(callback) = callbacks.get(element.name()) {
            callback(element);
        }
    });

    links
}
