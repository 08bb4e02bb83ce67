//! Disk cache for fetched resource bodies.
//!
//! Cache entries are flat files under the caller-supplied directory, named
//! by the SHA-256 of the locator. Entries are content-addressed by URL only:
//! a cached body is served as-is until the file is removed.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

/// Cache key for one fetched resource.
///
/// # Hash Format
///
/// SHA-256 of the full locator string, hex-encoded.
#[derive(Debug)]
pub struct ContentKey<'a> {
    /// Absolute resource locator.
    pub url: &'a Url,
}

impl ContentKey<'_> {
    /// Compute the hex-encoded hash naming this entry's cache file.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Path of the cache entry for `url` under `dir`.
pub(crate) fn entry_path(dir: &Path, url: &Url) -> PathBuf {
    dir.join(ContentKey { url }.compute_hash())
}

/// Read a cached body, if present.
pub(crate) fn read_cached(dir: &Path, url: &Url) -> Option<String> {
    let path = entry_path(dir, url);
    let body = fs::read_to_string(&path).ok()?;
    tracing::debug!(url = %url, path = %path.display(), "cache hit");
    Some(body)
}

/// Store a fetched body. Write failures are logged, never fatal: the cache
/// is an optimization, not a correctness requirement.
pub(crate) fn write_cached(dir: &Path, url: &Url, body: &str) {
    let path = entry_path(dir, url);
    if let Err(error) = fs::write(&path, body) {
        tracing::warn!(url = %url, path = %path.display(), %error, "failed to write cache entry");
    }
}
