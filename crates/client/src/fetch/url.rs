//! URL resolution for consistent request keys.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a URL or site-relative path against the worker's origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative input (`/menu2.html`) against `base`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://moonlight.test").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&base(), "/menu2.html").unwrap();
        assert_eq!(url.as_str(), "https://moonlight.test/menu2.html");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&base(), "/").unwrap();
        assert_eq!(url.as_str(), "https://moonlight.test/");
    }

    #[test]
    fn test_resolve_absolute_third_party() {
        let url = resolve(&base(), "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css").unwrap();
        assert_eq!(url.host_str(), Some("cdnjs.cloudflare.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&base(), "https://FONTS.GoogleAPIs.com/css2").unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&base(), "/menu2.html#desserts").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/menu2.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&base(), "/css2?family=Montserrat&display=swap").unwrap();
        assert_eq!(url.query(), Some("family=Montserrat&display=swap"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&base(), "  /index.html  ").unwrap();
        assert_eq!(url.as_str(), "https://moonlight.test/index.html");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&base(), "data:text/plain,hello");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&base(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&base(), "   "), Err(UrlError::Empty)));
    }
}
