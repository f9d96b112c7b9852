use url::{ParseError, Url};

/// Schemes allowed in rendered `href` and `src` attributes.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Determine whether a link or image target may be emitted as-is.
///
/// Relative URLs (`/documents/3`, `#contact`, `guide.pdf`) are accepted.
/// Absolute URLs must use one of the allowed schemes, so `javascript:`,
/// `data:` and `vbscript:` targets are rejected. Scheme detection follows
/// the WHATWG parser, which ignores embedded tabs and newlines and is
/// case-insensitive.
pub fn is_safe_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }

    match Url::parse(trimmed) {
        Ok(url) => ALLOWED_SCHEMES.contains(&url.scheme()),
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
