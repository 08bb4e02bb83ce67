//! Boundary with the host tokenizer.
//!
//! The assembler never builds the host's block tree itself; it pushes
//! assembled output lines, in document order, into a [`BlockSink`] opened at
//! the directive's position. Each line carries optional [`Origin`]
//! provenance so diagnostics raised inside included content reference the
//! included resource's line numbers, not the host document's.

use url::Url;

/// Provenance of one spliced line: where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin<'a> {
    /// Absolute locator of the resource the line was extracted from.
    pub source: &'a Url,
    /// 1-based line number within that resource.
    pub line: usize,
}

/// Failure reported by the host while consuming a spliced line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("host rejected spliced line: {0}")]
pub struct SinkError(pub String);

/// Receiver for assembled output lines.
///
/// One sink instance corresponds to one child parsing context in the host;
/// it is exclusively owned by the assembler for the duration of one
/// directive's processing. Lines without an origin are synthetic (fence
/// envelopes, `before`/`after` literals) or host passthrough.
pub trait BlockSink {
    /// Consume one output line at the current splice position.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] when the host cannot accept the line (e.g.,
    /// the nested content is malformed for the host format). The error
    /// aborts the current document run.
    fn push_line(&mut self, text: &str, origin: Option<Origin<'_>>) -> Result<(), SinkError>;
}

/// [`BlockSink`] that collects output lines into memory.
///
/// The simplest host: accepts everything and joins the result back into a
/// document string.
#[derive(Debug, Default)]
pub struct StringSink {
    lines: Vec<String>,
}

impl StringSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines collected so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the collected lines into a document string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.lines.join("\n")
    }
}

impl BlockSink for StringSink {
    fn push_line(&mut self, text: &str, _origin: Option<Origin<'_>>) -> Result<(), SinkError> {
        self.lines.push(text.to_owned());
        Ok(())
    }
}
