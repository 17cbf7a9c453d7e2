//! URL helpers.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use url::Url;

// ============================================================================
// Functions
// ============================================================================

/// Returns the percent-decoded form of `url`.
///
/// Invalid escapes leave the input unchanged.
#[must_use]
pub fn normalise_url(url: &str) -> String {
    urlencoding::decode(url)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| url.to_string())
}

/// Returns the host (and explicit port) of an `http(s)` URL.
///
/// Anything that is not an absolute `http` or `https` URL yields an empty
/// string.
#[must_use]
pub fn get_domain(url: &str) -> String {
    if !url.starts_with("http:/") && !url.starts_with("https:/") {
        return String::new();
    }
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let host = normalise_url(host);
    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain() {
        assert_eq!(get_domain("https://example.com"), "example.com");
        assert_eq!(get_domain("https://www.example.com"), "www.example.com");
        assert_eq!(
            get_domain("https://www.example.com/test.html"),
            "www.example.com"
        );
        assert_eq!(get_domain("http://example.com:8080/x"), "example.com:8080");
    }

    #[test]
    fn test_get_domain_rejects_non_urls() {
        assert_eq!(get_domain(""), "");
        assert_eq!(get_domain("Not a url"), "");
        assert_eq!(get_domain("ftp://example.com"), "");
    }

    #[test]
    fn test_normalise_url() {
        assert_eq!(
            normalise_url("https://example.com/%E6%B1%9F%E6%88%B8%E5%B7%9D"),
            "https://example.com/江戸川"
        );
        assert_eq!(normalise_url("https://example.com/%zz"), "https://example.com/%zz");
    }
}
