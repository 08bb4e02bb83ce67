//! Local filesystem retrieval for `file://` locators.

use std::fs;
use std::path::Path;

use url::Url;

use crate::{ContentRetriever, RetrievalError, split_lines};

/// Retriever for `file://` locators.
///
/// Reads go straight to the filesystem on every call; local reads are
/// cheaper than a disk cache, so the cache directory is ignored.
#[derive(Debug, Default)]
pub struct FileRetriever;

impl FileRetriever {
    /// Create a new file retriever.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ContentRetriever for FileRetriever {
    fn get_content(
        &self,
        source: &Url,
        _cache_dir: Option<&Path>,
    ) -> Result<Vec<String>, RetrievalError> {
        let path = source
            .to_file_path()
            .map_err(|()| RetrievalError::InvalidFileUrl {
                url: source.clone(),
            })?;
        let text = fs::read_to_string(&path).map_err(|source| RetrievalError::File {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), lines = text.lines().count(), "read local resource");
        Ok(split_lines(&text))
    }
}
