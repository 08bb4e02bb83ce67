//! Mock retrieval for testing.
//!
//! Provides [`MockRetriever`] so the inclusion engine can be tested without
//! filesystem or network access.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;

use url::Url;

use crate::{ContentRetriever, RetrievalError, split_lines};

/// In-memory retriever for tests.
///
/// Stores resource bodies keyed by locator. Use the builder methods to
/// register content; every call is recorded so tests can assert which
/// resources were fetched and how often.
///
/// # Example
///
/// ```
/// use mdsplice_retrieval::{ContentRetriever, MockRetriever};
/// use url::Url;
///
/// let retriever = MockRetriever::new()
///     .with_resource("file:///root.md", "# Root")
///     .with_failure("https://example.com/down.md");
///
/// let root = Url::parse("file:///root.md").unwrap();
/// assert_eq!(retriever.get_content(&root, None).unwrap(), vec!["# Root"]);
/// ```
#[derive(Debug, Default)]
pub struct MockRetriever {
    contents: HashMap<Url, String>,
    failures: HashSet<Url>,
    requests: RwLock<Vec<Url>>,
}

impl MockRetriever {
    /// Create a new empty mock retriever.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource body for a locator.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not an absolute URL.
    #[must_use]
    pub fn with_resource(mut self, url: &str, body: impl Into<String>) -> Self {
        let url = Url::parse(url).expect("mock locator must be absolute");
        self.contents.insert(url, body.into());
        self
    }

    /// Register a locator whose retrieval always fails.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not an absolute URL.
    #[must_use]
    pub fn with_failure(mut self, url: &str) -> Self {
        let url = Url::parse(url).expect("mock locator must be absolute");
        self.failures.insert(url);
        self
    }

    /// Locators requested so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<Url> {
        self.requests.read().expect("lock poisoned").clone()
    }
}

impl ContentRetriever for MockRetriever {
    fn get_content(
        &self,
        source: &Url,
        _cache_dir: Option<&Path>,
    ) -> Result<Vec<String>, RetrievalError> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(source.clone());
        }

        if self.failures.contains(source) {
            return Err(RetrievalError::Http {
                url: source.clone(),
                attempts: 1,
                reason: String::from("mock failure"),
            });
        }
        match self.contents.get(source) {
            Some(body) => Ok(split_lines(body)),
            None => Err(RetrievalError::NotFound {
                url: source.clone(),
            }),
        }
    }
}
