//! Link and image destination handling.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters percent-encoded in destinations. `%` is left alone so existing
/// escapes survive; non-ASCII is always encoded.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const DATA_IMAGE: &str = "data:image/";

/// Image payloads allowed in `data:` URLs.
const SAFE_IMAGE_TYPES: &[&str] = &["png;", "gif;", "jpeg;", "webp;", "svg+xml;"];

const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];

/// Case-insensitive ASCII prefix test.
fn has_prefix(s: &str, prefix: &str) -> bool {
    s.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Check whether a destination is potentially dangerous.
///
/// `javascript:`, `vbscript:`, `file:` and `data:` URLs are dangerous, except
/// `data:image/` URLs carrying PNG, GIF, JPEG, WebP or SVG payloads.
///
/// # Examples
///
/// ```
/// use mdscript_renderer::is_dangerous_url;
///
/// assert!(is_dangerous_url("JavaScript:alert(1)"));
/// assert!(!is_dangerous_url("data:image/png;base64,AAAA"));
/// assert!(!is_dangerous_url("https://example.com"));
/// ```
#[must_use]
pub fn is_dangerous_url(url: &str) -> bool {
    if has_prefix(url, DATA_IMAGE) {
        let payload = &url[DATA_IMAGE.len()..];
        return !SAFE_IMAGE_TYPES.iter().any(|ty| has_prefix(payload, ty));
    }
    DANGEROUS_SCHEMES.iter().any(|scheme| has_prefix(url, scheme))
}

/// Percent-encode a destination for use as `href`/`src`.
///
/// # Examples
///
/// ```
/// use mdscript_renderer::escape_url;
///
/// assert_eq!(escape_url("a b.html"), "a%20b.html");
/// assert_eq!(escape_url("caf%C3%A9"), "caf%C3%A9");
/// ```
#[must_use]
pub fn escape_url(url: &str) -> Cow<'_, str> {
    utf8_percent_encode(url, URL_ENCODE_SET).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangerous_schemes() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url("vbscript:msgbox"));
        assert!(is_dangerous_url("file:///etc/passwd"));
        assert!(is_dangerous_url("data:text/html;base64,PHNjcmlwdD4="));
    }

    #[test]
    fn test_scheme_matching_is_case_insensitive() {
        assert!(is_dangerous_url("JAVASCRIPT:alert(1)"));
        assert!(is_dangerous_url("VbScript:x"));
        assert!(is_dangerous_url("Data:text/plain,hi"));
        assert!(!is_dangerous_url("DATA:IMAGE/PNG;base64,AAAA"));
    }

    #[test]
    fn test_safe_data_images() {
        for url in [
            "data:image/png;base64,AAAA",
            "data:image/gif;base64,AAAA",
            "data:image/jpeg;base64,AAAA",
            "data:image/webp;base64,AAAA",
            "data:image/svg+xml;utf8,<svg/>",
        ] {
            assert!(!is_dangerous_url(url), "{url} should be safe");
        }
    }

    #[test]
    fn test_other_data_images_are_dangerous() {
        assert!(is_dangerous_url("data:image/bmp;base64,AAAA"));
        assert!(is_dangerous_url("data:image/"));
        assert!(is_dangerous_url("data:image/png"));
    }

    #[test]
    fn test_ordinary_urls_are_safe() {
        assert!(!is_dangerous_url("https://example.com"));
        assert!(!is_dangerous_url("./relative/page.html"));
        assert!(!is_dangerous_url("#anchor"));
        assert!(!is_dangerous_url("mailto:user@example.com"));
        assert!(!is_dangerous_url(""));
        assert!(!is_dangerous_url("java"));
    }

    #[test]
    fn test_non_ascii_prefix_does_not_panic() {
        assert!(!is_dangerous_url("é"));
        assert!(!is_dangerous_url("dataé:"));
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(escape_url("https://x.org/a b"), "https://x.org/a%20b");
        assert_eq!(escape_url("/q?a=1&b=2#frag"), "/q?a=1&b=2#frag");
        assert_eq!(escape_url("/café"), "/caf%C3%A9");
        assert_eq!(escape_url("a\"b<c>"), "a%22b%3Cc%3E");
    }
}
