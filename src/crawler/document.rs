//! Parsed documents and the read-only element views handed to callbacks
//!
//! A [`Document`] lives inside a single blocking walk job. [`Element`]s borrow
//! from it, so a callback cannot keep one past the walk.

use crate::url::resolve_reference;
use crate::ScrapeError;
use scraper::{ElementRef, Html};
use url::Url;

/// One fetched page: its element tree plus the URL relative links resolve against
pub struct Document {
    html: Html,
    base_url: Url,
}

impl Document {
    /// Parses an HTML body
    ///
    /// `base_url` should be the final request URL, after redirects.
    pub fn parse(body: &str, base_url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url,
        }
    }

    /// The URL relative references are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Visits every element in pre-order, parents before their children
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&Element<'a>),
    {
        for node in self.html.root_element().descendants() {
            if let Some(element) = ElementRef::wrap(node) {
                visit(&Element {
                    inner: element,
                    base_url: &self.base_url,
                });
            }
        }
    }
}

/// Read-only view of one element of a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
    base_url: &'a Url,
}

impl<'a> Element<'a> {
    /// Lowercase tag name, e.g. `img`
    pub fn name(&self) -> &'a str {
        self.inner.value().name()
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        self.inner.text().collect()
    }

    /// The document's base URL
    pub fn base_url(&self) -> &'a Url {
        self.base_url
    }

    /// Resolves a reference relative to the document's base URL
    pub fn resolve_url(&self, reference: &str) -> Result<Url, ScrapeError> {
        resolve_reference(self.base_url, reference)
    }

    /// Attribute value resolved to an absolute URL
    ///
    /// Returns `None` if the attribute is missing, blank, or does not resolve.
    pub fn absolute_attr(&self, name: &str) -> Option<String> {
        let value = self.attr(name)?;
        if value.trim().is_empty() {
            return None;
        }
        self.resolve_url(value).ok().map(String::from)
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
