//! Directive syntax recognition.
//!
//! Recognizes leaf inclusion directives of the form
//! `::include[source]{key="value" ...}` occupying a whole line, and tracks
//! fenced code blocks so directive text inside a fence stays inert.

/// Raw directive data before option resolution: the bracket content and the
/// ordered attribute list from the braces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeArgs {
    /// Content from `[...]`, the raw source value (may be empty).
    pub source: String,
    /// `key=value` attributes from `{...}`, in written order. Bare keys get
    /// the value `"true"`.
    pub attrs: Vec<(String, String)>,
}

/// Name of the inclusion directive.
const DIRECTIVE_NAME: &str = "include";

/// Recognize a whole-line leaf inclusion directive.
///
/// Returns `None` for anything else: other directive names, container
/// syntax (`:::`), inline text, or trailing garbage after the directive.
#[must_use]
pub fn parse_include_line(line: &str) -> Option<IncludeArgs> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("::")?;
    if rest.starts_with(':') {
        // Container syntax, not a leaf directive.
        return None;
    }

    let name_end = rest
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(rest.len());
    if &rest[..name_end] != DIRECTIVE_NAME {
        return None;
    }
    let rest = &rest[name_end..];

    let (source, consumed) = parse_delimited(rest, '[', ']');
    let rest = &rest[consumed..];
    let (attrs_str, consumed) = parse_delimited(rest, '{', '}');
    let rest = &rest[consumed..];

    // A leaf directive takes the whole line.
    if !rest.trim().is_empty() {
        return None;
    }

    Some(IncludeArgs {
        source,
        attrs: parse_attrs(&attrs_str),
    })
}

/// Parse a delimited section like `[content]` or `{attrs}`, handling
/// nesting. Returns `(content, bytes_consumed)`; missing or unclosed
/// sections consume nothing.
fn parse_delimited(s: &str, open: char, close: char) -> (String, usize) {
    if !s.starts_with(open) {
        return (String::new(), 0);
    }

    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == open => depth += 1,
            None if c == close => {
                depth -= 1;
                if depth == 0 {
                    return (s[open.len_utf8()..i].to_owned(), i + close.len_utf8());
                }
            }
            None => {}
        }
    }
    (String::new(), 0)
}

/// Parse an attribute string into ordered `(key, value)` pairs.
///
/// Supports `key="value"`, `key='value'`, `key=value` and bare `key`
/// (treated as `key=true`).
fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim();

    while !rest.is_empty() {
        rest = rest.trim_start();
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        if key_end == 0 {
            rest = &rest[1..];
            continue;
        }
        let key = rest[..key_end].to_owned();
        rest = &rest[key_end..];

        if let Some(after_eq) = rest.strip_prefix('=') {
            let (value, consumed) = parse_attr_value(after_eq);
            attrs.push((key, value));
            rest = &after_eq[consumed..];
        } else {
            attrs.push((key, String::from("true")));
        }
    }
    attrs
}

/// Parse one attribute value, quoted or bare. Returns
/// `(value, bytes_consumed)`.
fn parse_attr_value(s: &str) -> (String, usize) {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote) {
            return match inner.find(quote) {
                Some(i) => (inner[..i].to_owned(), i + 2),
                // Unclosed quote: take the remainder.
                None => (inner.to_owned(), s.len()),
            };
        }
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (s[..end].to_owned(), end)
}

/// Tracks fenced code blocks across lines.
///
/// Opened by three or more backticks or tildes; closed by a fence of the
/// same character at least as long as the opener.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Create a tracker with no open fence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one line.
    pub fn update(&mut self, line: &str) {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            '`'
        } else if trimmed.starts_with("~~~") {
            '~'
        } else {
            return;
        };
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        match self.open {
            None => self.open = Some((marker, len)),
            Some((open_marker, open_len)) if open_marker == marker && len >= open_len => {
                self.open = None;
            }
            Some(_) => {}
        }
    }

    /// Whether the cursor is currently inside a fence.
    #[must_use]
    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bare_directive() {
        let args = parse_include_line("::include[partial.md]").unwrap();
        assert_eq!(args.source, "partial.md");
        assert!(args.attrs.is_empty());
    }

    #[test]
    fn test_directive_with_attrs_in_order() {
        let args =
            parse_include_line(r#"::include[a.md]{lines="2:4" indent=2 cache}"#).unwrap();
        assert_eq!(args.source, "a.md");
        assert_eq!(
            args.attrs,
            vec![
                ("lines".to_owned(), "2:4".to_owned()),
                ("indent".to_owned(), "2".to_owned()),
                ("cache".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn test_single_quoted_value_keeps_double_quotes() {
        let args =
            parse_include_line(r#"::include[a.md]{clippings='[{"first-line": 1}]'}"#).unwrap();
        assert_eq!(args.attrs[0].0, "clippings");
        assert_eq!(args.attrs[0].1, r#"[{"first-line": 1}]"#);
    }

    #[test]
    fn test_leading_whitespace_allowed() {
        assert!(parse_include_line("  ::include[a.md]").is_some());
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert!(parse_include_line("::include[a.md] trailing").is_none());
    }

    #[test]
    fn test_other_syntax_rejected() {
        assert!(parse_include_line("plain text").is_none());
        assert!(parse_include_line("::youtube[xyz]").is_none());
        assert!(parse_include_line(":::include[a.md]").is_none());
        assert!(parse_include_line(":include[a.md]").is_none());
        assert!(parse_include_line("::include[unclosed").is_none());
    }

    #[test]
    fn test_missing_brackets_yield_empty_source() {
        let args = parse_include_line("::include{lines=\"1:2\"}").unwrap();
        assert_eq!(args.source, "");
        assert_eq!(args.attrs.len(), 1);
    }

    #[test]
    fn test_braces_inside_quotes_do_not_close() {
        let args = parse_include_line(r#"::include[a.md]{before="{"}"#).unwrap();
        assert_eq!(args.attrs, vec![("before".to_owned(), "{".to_owned())]);
    }

    #[test]
    fn test_fence_tracker() {
        let mut fence = FenceTracker::new();
        assert!(!fence.in_fence());

        fence.update("```rust");
        assert!(fence.in_fence());
        fence.update("::include[a.md]");
        assert!(fence.in_fence());
        // A shorter closer of the same char does not close a longer opener.
        fence.update("``");
        assert!(fence.in_fence());
        fence.update("```");
        assert!(!fence.in_fence());

        fence.update("~~~~");
        fence.update("~~~");
        assert!(fence.in_fence());
        fence.update("~~~~~");
        assert!(!fence.in_fence());
    }
}
