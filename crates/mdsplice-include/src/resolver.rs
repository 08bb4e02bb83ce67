//! Source locator resolution.
//!
//! Turns a directive's raw source string into an absolute, scheme-validated
//! [`Url`]. Resolution is a pure function of its inputs: the raw value, the
//! parent inclusion's locator (when nesting), and the root base.

use url::Url;

use crate::error::IncludeError;

/// Locator schemes the engine accepts.
pub const SUPPORTED_SCHEMES: [&str; 3] = ["file", "http", "https"];

/// Whether a scheme is in the supported set.
#[must_use]
pub fn is_supported_scheme(scheme: &str) -> bool {
    SUPPORTED_SCHEMES.contains(&scheme)
}

/// Resolve a raw source to an absolute locator.
///
/// Absolute values are accepted verbatim when their scheme is supported.
/// Relative values resolve against the parent inclusion's locator when one
/// exists, else against `base`.
///
/// # Errors
///
/// - [`IncludeError::UnsupportedScheme`] for absolute values outside
///   {file, http, https}
/// - [`IncludeError::InvalidSource`] when the value cannot be parsed or
///   joined into a valid locator
pub fn resolve_source(
    raw: &str,
    parent: Option<&Url>,
    base: &Url,
) -> Result<Url, IncludeError> {
    match Url::parse(raw) {
        Ok(url) => {
            if is_supported_scheme(url.scheme()) {
                Ok(url)
            } else {
                Err(IncludeError::UnsupportedScheme {
                    scheme: url.scheme().to_owned(),
                    value: raw.to_owned(),
                })
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => parent
            .unwrap_or(base)
            .join(raw)
            .map_err(|e| IncludeError::InvalidSource {
                value: raw.to_owned(),
                reason: e.to_string(),
            }),
        Err(e) => Err(IncludeError::InvalidSource {
            value: raw.to_owned(),
            reason: e.to_string(),
        }),
    }
}

/// Validate a base locator: absolute with a supported scheme.
///
/// # Errors
///
/// Fails like [`resolve_source`], naming the offending value.
pub fn validate_base(raw: &str) -> Result<Url, IncludeError> {
    let url = Url::parse(raw).map_err(|e| IncludeError::InvalidSource {
        value: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if is_supported_scheme(url.scheme()) {
        Ok(url)
    } else {
        Err(IncludeError::UnsupportedScheme {
            scheme: url.scheme().to_owned(),
            value: raw.to_owned(),
        })
    }
}

/// Default base locator derived from the process's working directory.
///
/// # Errors
///
/// Fails when the working directory cannot be determined or expressed as a
/// `file://` locator.
pub fn working_dir_base() -> Result<Url, IncludeError> {
    let cwd = std::env::current_dir().map_err(|e| IncludeError::InvalidSource {
        value: String::from("."),
        reason: e.to_string(),
    })?;
    Url::from_directory_path(&cwd).map_err(|()| IncludeError::InvalidSource {
        value: cwd.display().to_string(),
        reason: String::from("working directory is not an absolute path"),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn base() -> Url {
        Url::parse("file:///docs/").unwrap()
    }

    #[test]
    fn test_supported_absolute_locators_resolve_to_themselves() {
        for raw in [
            "file:///docs/a.md",
            "http://example.com/a.md",
            "https://example.com/a.md",
        ] {
            let url = resolve_source(raw, None, &base()).unwrap();
            assert_eq!(url.as_str(), raw);
        }
    }

    #[test]
    fn test_unsupported_scheme_names_the_scheme() {
        let err = resolve_source("ftp://example.com/a.md", None, &base()).unwrap_err();
        match err {
            IncludeError::UnsupportedScheme { scheme, value } => {
                assert_eq!(scheme, "ftp");
                assert_eq!(value, "ftp://example.com/a.md");
            }
            other => panic!("expected unsupported scheme, got {other:?}"),
        }
    }

    #[test]
    fn test_relative_resolves_against_parent() {
        let parent = Url::parse("file:///docs/nested/doc.md").unwrap();
        let url = resolve_source("other.md", Some(&parent), &base()).unwrap();
        assert_eq!(url.as_str(), "file:///docs/nested/other.md");

        let url = resolve_source("../up.md", Some(&parent), &base()).unwrap();
        assert_eq!(url.as_str(), "file:///docs/up.md");
    }

    #[test]
    fn test_relative_against_http_parent() {
        let parent = Url::parse("https://example.com/guide/index.md").unwrap();
        let url = resolve_source("part.md", Some(&parent), &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/guide/part.md");
    }

    #[test]
    fn test_root_relative_resolves_against_base() {
        let url = resolve_source("a.md", None, &base()).unwrap();
        assert_eq!(url.as_str(), "file:///docs/a.md");
    }

    #[test]
    fn test_unparseable_source_fails_with_value() {
        let err = resolve_source("http://[bad", None, &base()).unwrap_err();
        match err {
            IncludeError::InvalidSource { value, .. } => assert_eq!(value, "http://[bad"),
            other => panic!("expected invalid source, got {other:?}"),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let parent = Url::parse("file:///docs/doc.md").unwrap();
        let first = resolve_source("x/y.md", Some(&parent), &base()).unwrap();
        let second = resolve_source("x/y.md", Some(&parent), &base()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_base() {
        assert!(validate_base("file:///docs/").is_ok());
        assert!(matches!(
            validate_base("ftp://x/"),
            Err(IncludeError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            validate_base("not-a-url"),
            Err(IncludeError::InvalidSource { .. })
        ));
    }

    #[test]
    fn test_working_dir_base_is_a_file_directory() {
        let url = working_dir_base().unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with('/'));
    }
}
