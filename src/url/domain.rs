use crate::ScrapeError;
use url::Url;

/// Extracts the host from a URL
///
/// The host is returned lowercase and without the port. URLs without a host
/// (`mailto:`, `data:` and the like) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use image_scraper::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The set of URLs a crawl may follow: those on the seed's exact host
///
/// Subdomains are out of scope, as are other hosts; the port and scheme are
/// not compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    host: String,
}

impl DomainScope {
    /// Derives the scope from the crawl's seed URL
    pub fn from_seed(seed: &Url) -> Result<Self, ScrapeError> {
        let host = extract_domain(seed).ok_or_else(|| ScrapeError::MissingHost(seed.to_string()))?;
        Ok(Self { host })
    }

    /// The host links must match to be followed
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` lies on the scope's host
    pub fn allows(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| host == self.host)
    }
}
