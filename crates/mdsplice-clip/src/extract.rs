//! Range resolution and line extraction.

use crate::{ClipError, Clipping, ClippedLine, RangeSpec};

/// Extract the lines a clipping covers, applying its whitespace transforms.
///
/// Returns the transformed lines in source order, each tagged with its
/// 1-based line number in `lines`. `before`/`after` literals are injected
/// verbatim with no line number.
///
/// # Errors
///
/// Returns a [`ClipError`] when the range cannot be resolved to a non-empty
/// in-bounds span: out-of-bounds or zero line numbers, an empty resolved
/// range, or a marker that never matches.
pub fn extract<S: AsRef<str>>(
    lines: &[S],
    clipping: &Clipping,
) -> Result<Vec<ClippedLine>, ClipError> {
    let (first, last) = resolve_range(lines, &clipping.range)?;

    let mut out = Vec::with_capacity(last - first + 1 + 2);
    if let Some(before) = &clipping.before {
        out.push(ClippedLine::injected(before.clone()));
    }
    for number in first..=last {
        let text = transform_line(lines[number - 1].as_ref(), clipping);
        out.push(ClippedLine {
            text,
            line: Some(number),
        });
    }
    if let Some(after) = &clipping.after {
        out.push(ClippedLine::injected(after.clone()));
    }
    Ok(out)
}

/// Extract every clipping in order and concatenate the outputs.
///
/// An empty clipping list means the default whole-resource clipping.
/// Clippings are resolved independently: they may overlap and need not be in
/// source order, which allows repeating or reordering fragments of one
/// resource.
///
/// # Errors
///
/// Fails on the first clipping that does not resolve; see [`extract`].
pub fn extract_all<S: AsRef<str>>(
    lines: &[S],
    clippings: &[Clipping],
) -> Result<Vec<ClippedLine>, ClipError> {
    if clippings.is_empty() {
        return extract(lines, &Clipping::whole());
    }
    let mut out = Vec::new();
    for clipping in clippings {
        out.extend(extract(lines, clipping)?);
    }
    Ok(out)
}

/// Resolve a range spec to 1-based inclusive `(first, last)` bounds.
fn resolve_range<S: AsRef<str>>(
    lines: &[S],
    range: &RangeSpec,
) -> Result<(usize, usize), ClipError> {
    let len = lines.len();
    if len == 0 {
        return Err(ClipError::EmptyContent);
    }

    match range {
        RangeSpec::Lines { first, last } => {
            let first = match first {
                None => 1,
                Some(value) => resolve_bound(*value, len)?,
            };
            let last = match last {
                None => len,
                Some(value) => resolve_bound(*value, len)?,
            };
            if first > last {
                return Err(ClipError::EmptyRange { start: first, end: last });
            }
            Ok((first, last))
        }
        RangeSpec::Markers { start, end } => resolve_markers(lines, start, end.as_deref()),
    }
}

/// Resolve one 1-based bound, counting negative values from the end.
fn resolve_bound(value: i64, len: usize) -> Result<usize, ClipError> {
    if value == 0 {
        return Err(ClipError::ZeroLine);
    }
    let len_i64 = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if value > 0 { value } else { len_i64 + value + 1 };
    if resolved < 1 || resolved > len_i64 {
        return Err(ClipError::LineOutOfBounds { value, len });
    }
    usize::try_from(resolved).map_err(|_| ClipError::LineOutOfBounds { value, len })
}

/// Resolve marker-based bounds by substring search.
///
/// The start marker is only searched among lines `[1, len - 1]`: the last
/// line can never carry it because at least one line must follow the match.
fn resolve_markers<S: AsRef<str>>(
    lines: &[S],
    start_marker: &str,
    end_marker: Option<&str>,
) -> Result<(usize, usize), ClipError> {
    let len = lines.len();
    let matched = lines[..len - 1]
        .iter()
        .position(|line| line.as_ref().contains(start_marker))
        .ok_or_else(|| ClipError::StartMarkerNotFound {
            marker: start_marker.to_owned(),
        })?;
    // First extracted line is the one after the match.
    let first = matched + 2;

    let last = match end_marker {
        None => len,
        Some(marker) => {
            let found = lines[first - 1..]
                .iter()
                .position(|line| line.as_ref().contains(marker))
                .map(|offset| first - 1 + offset)
                .ok_or_else(|| ClipError::EndMarkerNotFound {
                    marker: marker.to_owned(),
                    from: first,
                })?;
            // `found` is the 0-based match; the range ends on the line
            // before it, which in 1-based terms is `found` itself.
            found
        }
    };

    if last < first {
        return Err(ClipError::EmptyRange { start: first, end: last });
    }
    Ok((first, last))
}

/// Apply indent, dedent and collapse, in that order. Empty lines pass
/// through unmodified; a transform value of `0` is disabled.
fn transform_line(line: &str, clipping: &Clipping) -> String {
    if line.is_empty() {
        return String::new();
    }

    let mut text = line.to_owned();
    if clipping.indent > 0 {
        text.insert_str(0, &" ".repeat(clipping.indent));
    }
    if clipping.dedent > 0 {
        let strip = leading_whitespace(&text).min(clipping.dedent);
        text.drain(..strip);
    }
    if clipping.collapse > 0 {
        let run = leading_whitespace(&text);
        if run > clipping.collapse {
            text.drain(clipping.collapse..run);
        }
    }
    text
}

/// Length of the leading run of spaces and tabs, in bytes (each counts as
/// one whitespace unit).
fn leading_whitespace(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}
