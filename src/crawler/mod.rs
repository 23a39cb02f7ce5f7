//! Crawler module for single-host page discovery
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching of documents
//! - HTML parsing and pre-order element walks
//! - Per-tag element callbacks
//! - The frontier coordinator and its workers

mod coordinator;
mod document;
mod engine;
mod fetcher;
mod registry;
mod worker;

pub use coordinator::CrawlSummary;
pub use document::{Document, Element};
pub use engine::Scraper;
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use registry::{CallbackRegistry, ElementCallback};
