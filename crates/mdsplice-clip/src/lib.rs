//! Clipping model and line extraction for mdsplice.
//!
//! A [`Clipping`] describes which portion of a resource to splice into a
//! document and how to reshape its leading whitespace. Extraction is a pure
//! function over the resource's lines: the same content and clipping always
//! produce the same output.
//!
//! # Range addressing
//!
//! A clipping addresses its line range in exactly one of two ways, enforced
//! by the [`RangeSpec`] enum:
//!
//! - **Line numbers**: 1-based `first`/`last` bounds. Negative values count
//!   from the end (`-1` is the last line); `None` leaves the bound open
//!   (start of content / end of content).
//! - **Markers**: substrings searched for in the content. The extracted
//!   range starts on the line *after* the start-marker match and ends on the
//!   line *before* the end-marker match (or at the end of content when no
//!   end marker is set).
//!
//! A resolved range is always non-empty and in bounds; anything else is a
//! [`ClipError`], never a silent clamp.
//!
//! # Example
//!
//! ```
//! use mdsplice_clip::{Clipping, extract};
//!
//! let lines = ["fn main() {", "    body();", "}"];
//! let clipping = Clipping::lines(Some(2), Some(2)).with_dedent(4);
//!
//! let out = extract(&lines, &clipping).unwrap();
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].text, "body();");
//! assert_eq!(out[0].line, Some(2));
//! ```

mod extract;

pub use extract::{extract, extract_all};

/// Error from clipping normalization or extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipError {
    /// The content has no lines at all.
    #[error("content is empty, nothing to clip")]
    EmptyContent,

    /// A line bound of `0` was given; line addressing is 1-based.
    #[error("line number 0 is invalid, line addressing is 1-based")]
    ZeroLine,

    /// A line bound resolved outside `[1, len]`.
    #[error("line {value} is out of bounds for content with {len} line(s)")]
    LineOutOfBounds { value: i64, len: usize },

    /// The resolved range contains no lines.
    #[error("clipped range is empty, resolved start line {start} is past end line {end}")]
    EmptyRange { start: usize, end: usize },

    /// The start marker never matched.
    #[error("start marker {marker:?} not found")]
    StartMarkerNotFound { marker: String },

    /// The end marker never matched after the start of the range.
    #[error("end marker {marker:?} not found at or after line {from}")]
    EndMarkerNotFound { marker: String, from: usize },
}

/// Which lines of the resource a clipping covers.
///
/// The two addressing modes are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSpec {
    /// 1-based line bounds. `None` is open-ended; negative values count from
    /// the end of the content (`-1` is the last line). `0` is invalid.
    Lines {
        first: Option<i64>,
        last: Option<i64>,
    },
    /// Substring markers. The range starts after the start-marker line and
    /// ends before the end-marker line (or at the end of content).
    Markers { start: String, end: Option<String> },
}

impl Default for RangeSpec {
    /// The whole resource.
    fn default() -> Self {
        Self::Lines {
            first: None,
            last: None,
        }
    }
}

/// A sub-range of a resource plus per-line whitespace transforms.
///
/// `indent`, `dedent` and `collapse` apply in that order to every non-empty
/// extracted line; a value of `0` disables the transform. `before` and
/// `after` are injected verbatim around the extracted range, outside the
/// transform pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipping {
    /// Line range to extract.
    pub range: RangeSpec,
    /// Literal line injected before the extracted range.
    pub before: Option<String>,
    /// Literal line injected after the extracted range.
    pub after: Option<String>,
    /// Whitespace units prepended to each non-empty line.
    pub indent: usize,
    /// Leading whitespace units removed (up to this many) from each
    /// non-empty line.
    pub dedent: usize,
    /// Maximum leading whitespace units kept on each non-empty line.
    pub collapse: usize,
}

impl Clipping {
    /// A clipping covering the whole resource, with no transforms.
    #[must_use]
    pub fn whole() -> Self {
        Self::default()
    }

    /// A line-number clipping. `None` bounds are open-ended; negative values
    /// count from the end of the content.
    #[must_use]
    pub fn lines(first: Option<i64>, last: Option<i64>) -> Self {
        Self {
            range: RangeSpec::Lines { first, last },
            ..Self::default()
        }
    }

    /// A marker clipping.
    #[must_use]
    pub fn markers(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            range: RangeSpec::Markers {
                start: start.into(),
                end,
            },
            ..Self::default()
        }
    }

    /// Set the literal line injected before the extracted range.
    #[must_use]
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    /// Set the literal line injected after the extracted range.
    #[must_use]
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Set the indent transform.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the dedent transform.
    #[must_use]
    pub fn with_dedent(mut self, dedent: usize) -> Self {
        self.dedent = dedent;
        self
    }

    /// Set the collapse transform.
    #[must_use]
    pub fn with_collapse(mut self, collapse: usize) -> Self {
        self.collapse = collapse;
        self
    }
}

/// One extracted output line with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClippedLine {
    /// Line text after whitespace transforms.
    pub text: String,
    /// 1-based line number in the source resource, or `None` for injected
    /// `before`/`after` literals.
    pub line: Option<usize>,
}

impl ClippedLine {
    /// A line extracted from the resource at the given 1-based line number.
    #[must_use]
    pub fn sourced(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line: Some(line),
        }
    }

    /// An injected literal line with no source position.
    #[must_use]
    pub fn injected(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: None,
        }
    }
}
