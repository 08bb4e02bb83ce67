//! Content retrieval for mdsplice.
//!
//! The inclusion engine consumes resources through the [`ContentRetriever`]
//! trait: given an absolute locator and an optional cache directory, return
//! the resource as ordered text lines. This crate provides the standard
//! implementations:
//!
//! - [`FileRetriever`]: `file://` locators via the local filesystem
//! - [`HttpRetriever`]: `http://`/`https://` locators via GET with a bounded
//!   retry policy and optional disk caching of response bodies
//! - [`StandardRetriever`]: dispatches on the locator scheme
//! - [`MockRetriever`]: in-memory implementation for tests
//!
//! Retrieval is idempotent and safely repeatable; callers may invoke it any
//! number of times for the same locator. Retry and timeout policy live
//! entirely in this crate, not in the inclusion engine.
//!
//! # Example
//!
//! ```
//! use mdsplice_retrieval::{ContentRetriever, MockRetriever};
//! use url::Url;
//!
//! let retriever = MockRetriever::new().with_resource("file:///a.md", "one\ntwo");
//! let url = Url::parse("file:///a.md").unwrap();
//! let lines = retriever.get_content(&url, None).unwrap();
//! assert_eq!(lines, vec!["one", "two"]);
//! ```

mod cache;
mod file;
mod http;
mod mock;

use std::path::{Path, PathBuf};

use url::Url;

pub use cache::ContentKey;
pub use file::FileRetriever;
pub use http::HttpRetriever;
pub use mock::MockRetriever;

/// Error from content retrieval, surfaced after any internal retry policy
/// is exhausted.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The locator scheme has no registered retriever.
    #[error("unsupported scheme {scheme:?} for {url}")]
    UnsupportedScheme { scheme: String, url: Url },

    /// A `file://` locator that does not map to a local path.
    #[error("{url} is not a usable file path")]
    InvalidFileUrl { url: Url },

    /// Local file read failure.
    #[error("failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP fetch failure after the retry policy was exhausted.
    #[error("GET {url} failed after {attempts} attempt(s): {reason}")]
    Http {
        url: Url,
        attempts: usize,
        reason: String,
    },

    /// No content is registered for the locator (mock retrieval).
    #[error("no content registered for {url}")]
    NotFound { url: Url },
}

/// Abstract content-retrieval capability consumed by the inclusion engine.
///
/// Implementations fetch the resource named by an absolute locator and
/// return it as ordered text lines. When `cache_dir` is given the
/// implementation may serve and store content there; callers never perform
/// their own locking around the cache.
pub trait ContentRetriever: Send + Sync {
    /// Fetch the resource as text lines.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] describing the terminal failure once any
    /// internal retry policy is exhausted.
    fn get_content(
        &self,
        source: &Url,
        cache_dir: Option<&Path>,
    ) -> Result<Vec<String>, RetrievalError>;
}

/// Scheme-dispatching retriever covering the supported locator set.
///
/// `file://` reads go straight to the filesystem and are never disk-cached;
/// `http://`/`https://` fetches honor the cache directory.
#[derive(Debug, Default)]
pub struct StandardRetriever {
    file: FileRetriever,
    http: HttpRetriever,
}

impl StandardRetriever {
    /// Create a retriever with default file and HTTP backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the HTTP backend (e.g., to change timeout or retry policy).
    #[must_use]
    pub fn with_http(mut self, http: HttpRetriever) -> Self {
        self.http = http;
        self
    }
}

impl ContentRetriever for StandardRetriever {
    fn get_content(
        &self,
        source: &Url,
        cache_dir: Option<&Path>,
    ) -> Result<Vec<String>, RetrievalError> {
        match source.scheme() {
            "file" => self.file.get_content(source, None),
            "http" | "https" => self.http.get_content(source, cache_dir),
            other => Err(RetrievalError::UnsupportedScheme {
                scheme: other.to_owned(),
                url: source.clone(),
            }),
        }
    }
}

/// Split fetched text into lines, dropping trailing newline handling to
/// `str::lines` semantics.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_standard_retriever_rejects_unknown_scheme() {
        let retriever = StandardRetriever::new();
        let url = Url::parse("ftp://example.com/x.md").unwrap();
        let err = retriever.get_content(&url, None).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"
        ));
    }
}
