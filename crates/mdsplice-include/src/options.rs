//! Directive option resolution.
//!
//! Converts raw directive data ([`IncludeArgs`]) into typed
//! [`IncludeOptions`] plus document-wide [`DirectiveDefaults`]. Flat
//! attributes cover the common cases (`lines`, markers, transforms); the
//! `clippings` attribute takes a JSON array of [`ClippingSpec`] for full
//! per-clipping control, including `before`/`after` delimiters split across
//! clippings.

use std::path::PathBuf;

use mdsplice_clip::{Clipping, RangeSpec};
use serde::Deserialize;
use url::Url;

use crate::directive::IncludeArgs;
use crate::error::IncludeError;
use crate::node::IncludeKind;
use crate::resolver;

/// Fully-resolved options for one inclusion directive.
#[derive(Debug, Clone, Default)]
pub struct IncludeOptions {
    /// Raw source value; `None` when the directive omitted it.
    pub source: Option<String>,
    /// Clippings to extract; empty means the whole resource.
    pub clippings: Vec<Clipping>,
    /// Content treatment.
    pub kind: IncludeKind,
    /// Language tag for the synthetic fence around Code-kind content.
    pub lang: Option<String>,
    /// Whether retrieval may use a disk cache.
    pub cache: bool,
    /// Explicit cache directory; must exist when given.
    pub cache_dir: Option<PathBuf>,
}

/// Document-wide defaults a directive may establish.
#[derive(Debug, Clone, Default)]
pub struct DirectiveDefaults {
    /// Default base locator for root-level relative sources.
    pub base: Option<Url>,
}

/// One clipping in the JSON `clippings` attribute.
///
/// Line-number and marker addressing are mutually exclusive; this is
/// validated on normalization into a [`Clipping`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ClippingSpec {
    /// 1-based first line; negative counts from the end.
    pub first_line: Option<i64>,
    /// 1-based last line; negative counts from the end.
    pub last_line: Option<i64>,
    /// Start marker substring.
    pub start_marker: Option<String>,
    /// End marker substring; requires a start marker.
    pub end_marker: Option<String>,
    /// Literal line injected before the extracted range.
    pub before: Option<String>,
    /// Literal line injected after the extracted range.
    pub after: Option<String>,
    /// Whitespace units to prepend per non-empty line.
    pub indent: usize,
    /// Leading whitespace units to strip per non-empty line.
    pub dedent: usize,
    /// Maximum leading whitespace units to keep per non-empty line.
    pub collapse: usize,
}

impl ClippingSpec {
    /// Normalize into a [`Clipping`], enforcing addressing-mode exclusivity.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError::InvalidOption`] when both addressing modes
    /// are set, or an end marker is given without a start marker.
    pub fn into_clipping(self) -> Result<Clipping, IncludeError> {
        let has_lines = self.first_line.is_some() || self.last_line.is_some();
        let range = match (self.start_marker, self.end_marker) {
            (Some(start), end) => {
                if has_lines {
                    return Err(IncludeError::InvalidOption {
                        field: String::from("start-marker"),
                        value: start,
                        reason: String::from(
                            "line-number and marker addressing are mutually exclusive",
                        ),
                    });
                }
                RangeSpec::Markers { start, end }
            }
            (None, Some(end)) => {
                return Err(IncludeError::InvalidOption {
                    field: String::from("end-marker"),
                    value: end,
                    reason: String::from("an end marker requires a start marker"),
                });
            }
            (None, None) => RangeSpec::Lines {
                first: self.first_line,
                last: self.last_line,
            },
        };
        Ok(Clipping {
            range,
            before: self.before,
            after: self.after,
            indent: self.indent,
            dedent: self.dedent,
            collapse: self.collapse,
        })
    }
}

/// Resolve raw directive data into typed options and document defaults.
///
/// # Errors
///
/// Returns [`IncludeError::InvalidOption`] naming the offending attribute
/// and value for unknown keys, malformed numbers, bad ranges, an invalid
/// `kind`, or conflicting clipping attributes.
pub fn resolve_options(
    args: &IncludeArgs,
) -> Result<(IncludeOptions, DirectiveDefaults), IncludeError> {
    let source = args.source.trim();
    let mut options = IncludeOptions {
        source: (!source.is_empty()).then(|| source.to_owned()),
        ..IncludeOptions::default()
    };
    let mut defaults = DirectiveDefaults::default();

    let mut line_specs: Vec<ClippingSpec> = Vec::new();
    let mut marker_spec: Option<ClippingSpec> = None;
    let mut json_specs: Option<Vec<ClippingSpec>> = None;
    let mut indent = 0usize;
    let mut dedent = 0usize;
    let mut collapse = 0usize;
    let mut before: Option<String> = None;
    let mut after: Option<String> = None;

    for (key, value) in &args.attrs {
        match key.as_str() {
            "lines" => {
                for part in value.split(',') {
                    line_specs.push(parse_line_range(part.trim())?);
                }
            }
            "start-marker" => {
                marker_spec.get_or_insert_with(ClippingSpec::default).start_marker =
                    Some(value.clone());
            }
            "end-marker" => {
                marker_spec.get_or_insert_with(ClippingSpec::default).end_marker =
                    Some(value.clone());
            }
            "indent" => indent = parse_count(key, value)?,
            "dedent" => dedent = parse_count(key, value)?,
            "collapse" => collapse = parse_count(key, value)?,
            "before" => before = Some(value.clone()),
            "after" => after = Some(value.clone()),
            "kind" => options.kind = parse_kind(value)?,
            "lang" => options.lang = Some(value.clone()),
            "cache" => options.cache = parse_bool(key, value)?,
            "cache-dir" => {
                options.cache = true;
                options.cache_dir = Some(PathBuf::from(value));
            }
            "base" => defaults.base = Some(resolver::validate_base(value)?),
            "clippings" => {
                let specs: Vec<ClippingSpec> =
                    serde_json::from_str(value).map_err(|e| IncludeError::InvalidOption {
                        field: key.clone(),
                        value: value.clone(),
                        reason: e.to_string(),
                    })?;
                json_specs = Some(specs);
            }
            _ => {
                return Err(IncludeError::InvalidOption {
                    field: key.clone(),
                    value: value.clone(),
                    reason: String::from("unrecognized option"),
                });
            }
        }
    }

    let flat_is_empty = line_specs.is_empty()
        && marker_spec.is_none()
        && (indent, dedent, collapse) == (0, 0, 0)
        && before.is_none()
        && after.is_none();

    let specs = match json_specs {
        Some(specs) => {
            if !flat_is_empty {
                return Err(IncludeError::InvalidOption {
                    field: String::from("clippings"),
                    value: String::from("..."),
                    reason: String::from(
                        "cannot be combined with flat clipping attributes",
                    ),
                });
            }
            specs
        }
        None => {
            let mut specs = match marker_spec {
                Some(spec) => {
                    if !line_specs.is_empty() {
                        return Err(IncludeError::InvalidOption {
                            field: String::from("lines"),
                            value: String::new(),
                            reason: String::from(
                                "line-number and marker addressing are mutually exclusive",
                            ),
                        });
                    }
                    vec![spec]
                }
                None => line_specs,
            };
            // Transforms or delimiters without a range apply to the whole
            // resource.
            if specs.is_empty() && !flat_is_empty {
                specs.push(ClippingSpec::default());
            }
            for spec in &mut specs {
                spec.indent = indent;
                spec.dedent = dedent;
                spec.collapse = collapse;
            }
            if let (Some(text), Some(first)) = (before, specs.first_mut()) {
                first.before = Some(text);
            }
            if let (Some(text), Some(last)) = (after, specs.last_mut()) {
                last.after = Some(text);
            }
            specs
        }
    };

    options.clippings = specs
        .into_iter()
        .map(ClippingSpec::into_clipping)
        .collect::<Result<_, _>>()?;

    Ok((options, defaults))
}

/// Parse one `FIRST:LAST` range (either side may be empty or negative) or a
/// single line number.
fn parse_line_range(part: &str) -> Result<ClippingSpec, IncludeError> {
    if let Some((first, last)) = part.split_once(':') {
        Ok(ClippingSpec {
            first_line: parse_bound(first, part)?,
            last_line: parse_bound(last, part)?,
            ..ClippingSpec::default()
        })
    } else {
        let line: i64 = part.parse().map_err(|_| IncludeError::InvalidOption {
            field: String::from("lines"),
            value: part.to_owned(),
            reason: String::from("expected FIRST:LAST or a single line number"),
        })?;
        Ok(ClippingSpec {
            first_line: Some(line),
            last_line: Some(line),
            ..ClippingSpec::default()
        })
    }
}

/// Parse one side of a `FIRST:LAST` range; empty means open-ended.
fn parse_bound(side: &str, whole: &str) -> Result<Option<i64>, IncludeError> {
    let side = side.trim();
    if side.is_empty() {
        return Ok(None);
    }
    side.parse()
        .map(Some)
        .map_err(|_| IncludeError::InvalidOption {
            field: String::from("lines"),
            value: whole.to_owned(),
            reason: String::from("line bounds must be integers"),
        })
}

/// Parse a non-negative transform count.
fn parse_count(field: &str, value: &str) -> Result<usize, IncludeError> {
    value.parse().map_err(|_| IncludeError::InvalidOption {
        field: field.to_owned(),
        value: value.to_owned(),
        reason: String::from("expected a non-negative integer"),
    })
}

/// Parse a boolean attribute.
fn parse_bool(field: &str, value: &str) -> Result<bool, IncludeError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(IncludeError::InvalidOption {
            field: field.to_owned(),
            value: value.to_owned(),
            reason: String::from("expected \"true\" or \"false\""),
        }),
    }
}

/// Parse the content-kind attribute.
fn parse_kind(value: &str) -> Result<IncludeKind, IncludeError> {
    match value {
        "markdown" => Ok(IncludeKind::Markdown),
        "code" => Ok(IncludeKind::Code),
        _ => Err(IncludeError::InvalidOption {
            field: String::from("kind"),
            value: value.to_owned(),
            reason: String::from("expected \"markdown\" or \"code\""),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(source: &str, attrs: &[(&str, &str)]) -> IncludeArgs {
        IncludeArgs {
            source: source.to_owned(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn test_bare_directive_defaults() {
        let (options, defaults) = resolve_options(&args("a.md", &[])).unwrap();
        assert_eq!(options.source.as_deref(), Some("a.md"));
        assert!(options.clippings.is_empty());
        assert_eq!(options.kind, IncludeKind::Markdown);
        assert!(!options.cache);
        assert!(defaults.base.is_none());
    }

    #[test]
    fn test_empty_source_is_none() {
        let (options, _) = resolve_options(&args("  ", &[])).unwrap();
        assert_eq!(options.source, None);
    }

    #[test]
    fn test_lines_attribute_variants() {
        let (options, _) = resolve_options(&args(
            "a.md",
            &[("lines", "2:4,7,10:,-3:-1,:5")],
        ))
        .unwrap();
        let ranges: Vec<_> = options
            .clippings
            .iter()
            .map(|c| match &c.range {
                RangeSpec::Lines { first, last } => (*first, *last),
                RangeSpec::Markers { .. } => panic!("expected line range"),
            })
            .collect();
        assert_eq!(
            ranges,
            vec![
                (Some(2), Some(4)),
                (Some(7), Some(7)),
                (Some(10), None),
                (Some(-3), Some(-1)),
                (None, Some(5)),
            ]
        );
    }

    #[test]
    fn test_transforms_apply_to_every_range() {
        let (options, _) = resolve_options(&args(
            "a.md",
            &[("lines", "1:2,5:6"), ("indent", "2"), ("dedent", "1")],
        ))
        .unwrap();
        assert!(options.clippings.iter().all(|c| c.indent == 2 && c.dedent == 1));
    }

    #[test]
    fn test_before_first_after_last() {
        let (options, _) = resolve_options(&args(
            "a.md",
            &[("lines", "1:2,5:6"), ("before", "<<<"), ("after", ">>>")],
        ))
        .unwrap();
        assert_eq!(options.clippings[0].before.as_deref(), Some("<<<"));
        assert_eq!(options.clippings[0].after, None);
        assert_eq!(options.clippings[1].after.as_deref(), Some(">>>"));
    }

    #[test]
    fn test_markers() {
        let (options, _) = resolve_options(&args(
            "a.md",
            &[("start-marker", "BEGIN"), ("end-marker", "END")],
        ))
        .unwrap();
        assert_eq!(options.clippings.len(), 1);
        assert_eq!(
            options.clippings[0].range,
            RangeSpec::Markers {
                start: "BEGIN".to_owned(),
                end: Some("END".to_owned()),
            }
        );
    }

    #[test]
    fn test_transforms_without_range_cover_whole_resource() {
        let (options, _) = resolve_options(&args("a.md", &[("indent", "4")])).unwrap();
        assert_eq!(options.clippings.len(), 1);
        assert_eq!(options.clippings[0].range, RangeSpec::default());
        assert_eq!(options.clippings[0].indent, 4);
    }

    #[test]
    fn test_lines_and_markers_conflict() {
        let err = resolve_options(&args(
            "a.md",
            &[("lines", "1:2"), ("start-marker", "X")],
        ))
        .unwrap_err();
        assert!(matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "lines"));
    }

    #[test]
    fn test_end_marker_requires_start_marker() {
        let err = resolve_options(&args("a.md", &[("end-marker", "END")])).unwrap_err();
        assert!(
            matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "end-marker")
        );
    }

    #[test]
    fn test_clippings_json() {
        let json = r#"[
            {"first-line": 1, "last-line": 2, "after": "---"},
            {"start-marker": "BEGIN", "indent": 2}
        ]"#;
        let (options, _) = resolve_options(&args("a.md", &[("clippings", json)])).unwrap();
        assert_eq!(options.clippings.len(), 2);
        assert_eq!(options.clippings[0].after.as_deref(), Some("---"));
        assert_eq!(options.clippings[1].indent, 2);
        assert_eq!(
            options.clippings[1].range,
            RangeSpec::Markers {
                start: "BEGIN".to_owned(),
                end: None,
            }
        );
    }

    #[test]
    fn test_clippings_json_rejects_flat_combination() {
        let err = resolve_options(&args(
            "a.md",
            &[("clippings", "[]"), ("indent", "2")],
        ))
        .unwrap_err();
        assert!(
            matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "clippings")
        );
    }

    #[test]
    fn test_clippings_json_mixed_addressing_rejected() {
        let json = r#"[{"first-line": 1, "start-marker": "X"}]"#;
        let err = resolve_options(&args("a.md", &[("clippings", json)])).unwrap_err();
        assert!(matches!(err, IncludeError::InvalidOption { .. }));
    }

    #[test]
    fn test_bad_numbers_name_the_field() {
        let err = resolve_options(&args("a.md", &[("indent", "two")])).unwrap_err();
        match err {
            IncludeError::InvalidOption { field, value, .. } => {
                assert_eq!(field, "indent");
                assert_eq!(value, "two");
            }
            other => panic!("expected invalid option, got {other:?}"),
        }

        let err = resolve_options(&args("a.md", &[("lines", "x:y")])).unwrap_err();
        assert!(matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "lines"));
    }

    #[test]
    fn test_kind_and_lang() {
        let (options, _) =
            resolve_options(&args("a.rs", &[("kind", "code"), ("lang", "rust")])).unwrap();
        assert_eq!(options.kind, IncludeKind::Code);
        assert_eq!(options.lang.as_deref(), Some("rust"));

        let err = resolve_options(&args("a.rs", &[("kind", "binary")])).unwrap_err();
        assert!(matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "kind"));
    }

    #[test]
    fn test_cache_attributes() {
        let (options, _) = resolve_options(&args("a.md", &[("cache", "true")])).unwrap();
        assert!(options.cache);
        assert_eq!(options.cache_dir, None);

        let (options, _) =
            resolve_options(&args("a.md", &[("cache-dir", "/tmp/cache")])).unwrap();
        assert!(options.cache);
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn test_base_default() {
        let (_, defaults) =
            resolve_options(&args("a.md", &[("base", "file:///docs/")])).unwrap();
        assert_eq!(defaults.base.unwrap().as_str(), "file:///docs/");

        let err = resolve_options(&args("a.md", &[("base", "ftp://x/")])).unwrap_err();
        assert!(matches!(err, IncludeError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = resolve_options(&args("a.md", &[("frobnicate", "1")])).unwrap_err();
        assert!(
            matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "frobnicate")
        );
    }
}
