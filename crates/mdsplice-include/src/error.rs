//! Error types for the inclusion engine.

use std::path::PathBuf;

use mdsplice_clip::ClipError;
use mdsplice_retrieval::RetrievalError;
use url::Url;

use crate::sink::SinkError;

/// Error from directive processing.
///
/// Every variant is terminal for the current document run. Configuration
/// errors name the offending field and value; content errors accumulate
/// provenance (`source` + `line`) at each recursion level as they propagate
/// outward, so the outermost caller sees the full path from the root
/// document down to the failing resource.
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    /// The directive has no `source` option.
    #[error("directive is missing the required \"source\" option")]
    MissingSource,

    /// A directive option failed to parse or validate.
    #[error("invalid option {field:?} with value {value:?}: {reason}")]
    InvalidOption {
        field: String,
        value: String,
        reason: String,
    },

    /// The raw source could not be resolved to an absolute locator.
    #[error("invalid source {value:?}: {reason}")]
    InvalidSource { value: String, reason: String },

    /// The source resolved to a locator outside the supported scheme set.
    #[error("unsupported scheme {scheme:?} in source {value:?} (supported: file, http, https)")]
    UnsupportedScheme { scheme: String, value: String },

    /// A caller-supplied cache directory does not exist.
    #[error("cache directory {path} does not exist or is not a directory")]
    InvalidCacheDir { path: PathBuf },

    /// A clipping failed to resolve against the retrieved content.
    #[error("invalid clipping for {source}: {inner}")]
    Clip {
        source: Url,
        #[source]
        inner: ClipError,
    },

    /// A directive re-entered its own call site. The chain runs from the
    /// outermost open inclusion down to the point of repetition.
    #[error("inclusion cycle detected: {chain}")]
    Cycle { chain: String },

    /// The depth guard tripped on a non-cyclic but pathologically deep
    /// inclusion chain.
    #[error("maximum inclusion depth ({max}) exceeded")]
    TooDeep { max: usize },

    /// Content retrieval failed after its retry policy was exhausted.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// The host rejected a spliced line.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A failure inside included content, wrapped with the location it
    /// passed through.
    #[error("in {source}, line {line}: {inner}")]
    Content {
        source: Url,
        line: usize,
        #[source]
        inner: Box<IncludeError>,
    },
}

impl IncludeError {
    /// Wrap this error with the inclusion level it is propagating out of.
    #[must_use]
    pub(crate) fn with_provenance(self, source: &Url, line: usize) -> Self {
        Self::Content {
            source: source.clone(),
            line,
            inner: Box::new(self),
        }
    }

    /// The innermost error, unwrapping provenance layers.
    #[must_use]
    pub fn root_cause(&self) -> &IncludeError {
        match self {
            Self::Content { inner, .. } => inner.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_nests_outward() {
        let a = Url::parse("file:///a.md").unwrap();
        let b = Url::parse("file:///b.md").unwrap();

        let err = IncludeError::MissingSource
            .with_provenance(&b, 2)
            .with_provenance(&a, 3);

        let message = err.to_string();
        assert_eq!(
            message,
            "in file:///a.md, line 3: in file:///b.md, line 2: \
             directive is missing the required \"source\" option"
        );
        assert!(matches!(err.root_cause(), IncludeError::MissingSource));
    }
}
