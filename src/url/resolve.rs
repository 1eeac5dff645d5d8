use crate::LinkResolutionError;
use url::Url;

/// Resolves a raw link against the URL of the document it was found in
///
/// Surrounding whitespace is trimmed; an empty link resolves to `None`.
///
/// # Examples
///
/// ```
/// use crawly::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/docs/index.html").unwrap();
/// let link = resolve_link(&base, " ../about ").unwrap();
/// assert_eq!(link.as_deref(), Some("http://example.com/about"));
/// ```
pub fn resolve_link(base: &Url, raw: &str) -> Result<Option<String>, LinkResolutionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    base.join(raw)
        .map(|url| Some(url.to_string()))
        .map_err(|source| LinkResolutionError {
            link: raw.to_string(),
            base: base.to_string(),
            source,
        })
}

/// Returns true if the link starts with `http://` or `https://`
pub fn has_web_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Prefixes `http://` onto links that lack a web scheme
///
/// # Examples
///
/// ```
/// use crawly::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com/page"), "http://example.com/page");
/// assert_eq!(ensure_scheme("https://example.com/"), "https://example.com/");
/// ```
pub fn ensure_scheme(link: &str) -> String {
    if has_web_scheme(link) {
        link.to_string()
    } else {
        format!("http://{}", link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve_link(&base(), "/one").unwrap().as_deref(),
            Some("http://example.com/one")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve_link(&base(), "other.html").unwrap().as_deref(),
            Some("http://example.com/dir/other.html")
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve_link(&base(), "//cdn.example.net/a.png")
                .unwrap()
                .as_deref(),
            Some("http://cdn.example.net/a.png")
        );
    }

    #[test]
    fn test_resolve_keeps_absolute() {
        assert_eq!(
            resolve_link(&base(), "https://other.org/x").unwrap().as_deref(),
            Some("https://other.org/x")
        );
    }

    #[test]
    fn test_resolve_empty_is_none() {
        assert_eq!(resolve_link(&base(), "   ").unwrap(), None);
    }

    #[test]
    fn test_resolve_failure_is_error() {
        let err = resolve_link(&base(), "http://[::1").unwrap_err();
        assert_eq!(err.link, "http://[::1");
        assert_eq!(err.base, "http://example.com/dir/page.html");
    }

    #[test]
    fn test_has_web_scheme() {
        assert!(has_web_scheme("http://a.com"));
        assert!(has_web_scheme("HTTPS://a.com"));
        assert!(!has_web_scheme("ftp://a.com"));
        assert!(!has_web_scheme("mailto:x@a.com"));
        assert!(!has_web_scheme("a.com"));
        assert!(!has_web_scheme("http"));
    }

    #[test]
    fn test_ensure_scheme() {
        assert_eq!(ensure_scheme("a.com/x"), "http://a.com/x");
        assert_eq!(ensure_scheme("http://a.com/x"), "http://a.com/x");
        assert_eq!(ensure_scheme("HTTPS://a.com/x"), "HTTPS://a.com/x");
    }
}
