//! Tag name → element callback registry
//!
//! Callbacks are registered before a crawl starts. Each crawl takes an
//! immutable snapshot, so workers read it without any locking.

use crate::crawler::document::Element;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked for every element with a registered tag name
///
/// Runs synchronously on the blocking thread walking the document.
pub type ElementCallback = Arc<dyn Fn(&Element<'_>) + Send + Sync>;

/// Mapping from lowercase tag name to its callback
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, ElementCallback>,
}

impl CallbackRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `tag`, replacing any earlier registration
    pub fn register<F>(&mut self, tag: &str, callback: F)
    where
        F: Fn(&Element<'_>) + Send + Sync + 'static,
    {
        self.callbacks
            .insert(tag.to_ascii_lowercase(), Arc::new(callback));
    }

    /// The callback registered for `tag`, if any
    pub fn get(&self, tag: &str) -> Option<&ElementCallback> {
        self.callbacks.get(tag)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.callbacks.keys().collect();
        tags.sort();
        f.debug_struct("CallbackRegistry").field("tags", &tags).finish()
    }
}
