//! Request path utilities
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Trims a request path down to the part routes match against
///
/// **Pure function**, zero-copy: the result borrows from the input.
///
/// # Rules
///
/// - Query string (`?…`) and fragment (`#…`) are dropped
/// - One leading `/` is removed
/// - One trailing `/` is removed
/// - Interior empty segments (`//`) are kept; they never match a parameter
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::path::trim_request_path;
///
/// assert_eq!(trim_request_path("/orders/42"), "orders/42");
/// assert_eq!(trim_request_path("/orders/42/?page=2#top"), "orders/42");
/// assert_eq!(trim_request_path("/"), "");
/// assert_eq!(trim_request_path("orders"), "orders");
/// ```
pub fn trim_request_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Splits a request path into percent-decoded segments
///
/// Segments that do not decode to valid UTF-8 are kept raw.
/// `Cow::Borrowed` is returned for segments without escapes.
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::path::request_segments;
///
/// assert_eq!(request_segments("/files/my%20doc.txt"), vec!["files", "my doc.txt"]);
/// assert!(request_segments("/").is_empty());
/// ```
pub fn request_segments(path: &str) -> Vec<Cow<'_, str>> {
    let trimmed = trim_request_path(path);
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed.split('/').map(decode_segment).collect()
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_request_path() {
        assert_eq!(trim_request_path(""), "");
        assert_eq!(trim_request_path("/"), "");
        assert_eq!(trim_request_path("/about/"), "about");
        assert_eq!(trim_request_path("/a//b"), "a//b");
        assert_eq!(trim_request_path("/search?q=a/b"), "search");
        assert_eq!(trim_request_path("/docs#intro"), "docs");
    }

    #[test]
    fn test_request_segments_borrow_when_possible() {
        let segments = request_segments("/users/123");
        assert!(matches!(segments[0], Cow::Borrowed("users")));
        assert!(matches!(segments[1], Cow::Borrowed("123")));
    }

    #[test]
    fn test_request_segments_decode() {
        assert_eq!(request_segments("/a%2Fb/c%20d"), vec!["a/b", "c d"]);
        // Invalid UTF-8 after decoding stays raw
        assert_eq!(request_segments("/bad%FF"), vec!["bad%FF"]);
    }

    #[test]
    fn test_request_segments_keep_empty_interior() {
        assert_eq!(request_segments("/a//b"), vec!["a", "", "b"]);
    }
}
