//! URL handling module for Image-Scraper
//!
//! This module provides reference resolution, the crawl's domain scope, and
//! the mapping from resource URLs to destination filenames.

mod domain;
mod filename;

// Re-export main functions
pub use domain::{extract_domain, DomainScope};
pub use filename::file_name_from_url;

use crate::ScrapeError;
use ::url::Url;

/// Resolves a (possibly relative) reference against a base URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use image_scraper::url::resolve_reference;
///
/// let base = Url::parse("https://example.com/page").unwrap();
/// let resolved = resolve_reference(&base, "/x.png").unwrap();
/// assert_eq!(resolved.as_str(), "https://example.com/x.png");
/// ```
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url, ScrapeError> {
    base.join(reference.trim())
        .map_err(|source| ScrapeError::Resolve {
            base: base.to_string(),
            reference: reference.to_string(),
            source,
        })
}
