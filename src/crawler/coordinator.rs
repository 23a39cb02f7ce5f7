//! Frontier coordinator - the single owner of crawl state
//!
//! The coordinator is the only place the seen-set and frontier are touched.
//! Workers receive URLs over the work channel and report back exactly one
//! [`PageOutcome`] per URL over the inbox. The coordinator counts URLs that
//! were dispatched but not yet reported; the crawl is over when that count is
//! zero and the frontier is empty, since no one is left to discover new work.

use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a worker reports back for one dispatched URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageOutcome {
    pub url: String,
    /// Same-host links found on the page, in document order
    pub links: Vec<String>,
    pub fetched: bool,
}

impl PageOutcome {
    pub fn crawled(url: String, links: Vec<String>) -> Self {
        Self {
            url,
            links,
            fetched: true,
        }
    }

    pub fn failed(url: String) -> Self {
        Self {
            url,
            links: Vec::new(),
            fetched: false,
        }
    }
}

/// Totals for one finished (or cancelled) crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages fetched and walked
    pub pages_crawled: usize,
    /// Pages whose fetch or walk failed
    pub pages_failed: usize,
    /// Distinct URLs ever admitted to the frontier, including the seed
    pub urls_seen: usize,
}

/// Seen-set, pending queue and in-flight counter
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    seen: HashSet<String>,
    pending: VecDeque<String>,
    in_flight: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` unless it was ever admitted before
    pub fn admit(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Takes the next pending URL and counts it as in flight
    pub fn dispatch(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.in_flight += 1;
        Some(url)
    }

    /// Marks one dispatched URL as fully processed
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn seen(&self) -> usize {
        self.seen.len()
    }

    /// Nothing queued and nothing being processed
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

/// Owns the frontier for the duration of one crawl
pub(crate) struct Coordinator {
    frontier: Frontier,
    summary: CrawlSummary,
}

impl Coordinator {
    /// Creates a coordinator whose frontier holds only the seed
    pub fn new(seed: String) -> Self {
        let mut frontier = Frontier::new();
        frontier.admit(seed);
        Self {
            frontier,
            summary: CrawlSummary::default(),
        }
    }

    /// Runs the distribution loop until the frontier drains or `cancel` fires
    ///
    /// Dropping `work` on return closes the work channel, which tells idle
    /// workers to exit.
    pub async fn run(
        mut self,
        work: mpsc::Sender<String>,
        mut inbox: mpsc::Receiver<PageOutcome>,
        cancel: CancellationToken,
    ) -> CrawlSummary {
        loop {
            if self.frontier.is_drained() {
                tracing::debug!("frontier drained, no pages in flight");
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!(
                        pending = self.frontier.pending(),
                        in_flight = self.frontier.in_flight(),
                        "crawl cancelled"
                    );
                    break;
                }

                outcome = inbox.recv() => match outcome {
                    Some(outcome) => self.record(outcome),
                    None => {
                        tracing::warn!(
                            in_flight = self.frontier.in_flight(),
                            "all crawl workers exited before the frontier drained"
                        );
                        break;
                    }
                },

                permit = work.reserve(), if self.frontier.has_pending() => match permit {
                    Ok(permit) => {
                        if let Some(url) = self.frontier.dispatch() {
                            tracing::trace!(url = %url, "dispatching");
                            permit.send(url);
                        }
                    }
                    Err(_) => {
                        tracing::warn!("work channel closed, stopping crawl");
                        break;
                    }
                },
            }
        }

        self.summary.urls_seen = self.frontier.seen();
        self.summary
    }

    fn record(&mut self, outcome: PageOutcome) {
        self.frontier.complete();

        if outcome.fetched {
            self.summary.pages_crawled += 1;
        } else {
            self.summary.pages_failed += 1;
        }

        let found = outcome.links.len();
        let admitted = outcome
            .links
            .into_iter()
            .map(|link| self.frontier.admit(link))
            .filter(|admitted| *admitted)
            .count();

        tracing::debug!(
            url = %outcome.url,
            found,
            admitted,
            pending = self.frontier.pending(),
            in_flight = self.frontier.in_flight(),
            "page processed"
        );
    }
}
