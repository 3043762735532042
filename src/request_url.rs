//! Reconstruction of the request URL recorded on the span.
//!
//! Server-side requests usually carry only a path and a query, so the URL is
//! assembled from the individual request fields instead of being read from a
//! single parsed URL. The result is best-effort: nothing is decoded,
//! validated or normalized.

use regex::{NoExpand, Regex};

use crate::request::RequestView;

/// Replacement for every query substring matched by the obfuscation pattern.
pub const REDACTED: &str = "<redacted>";

/// Rebuilds the request URL from its parts.
///
/// - scheme: the request's own, else `https` over TLS, else `http`
/// - `scheme://host` prefix only when the host is known
/// - query only when `include_query` is set, with every match of `redact`
///   replaced by [`REDACTED`]
/// - fragment whenever present
///
/// ## Example
///
/// ```rust
/// use httptrace::{reconstruct_url, RequestView};
/// use regex::Regex;
///
/// let view = RequestView::builder()
///     .scheme("https")
///     .host("example.com")
///     .path("/items")
///     .query("token=abc")
///     .fragment("frag")
///     .build();
/// let pattern = Regex::new(r"token=\w+").unwrap();
///
/// assert_eq!(
///     reconstruct_url(&view, true, Some(&pattern)),
///     "https://example.com/items?<redacted>#frag"
/// );
/// assert_eq!(reconstruct_url(&view, false, Some(&pattern)), "https://example.com/items#frag");
/// ```
pub fn reconstruct_url(view: &RequestView, include_query: bool, redact: Option<&Regex>) -> String {
    let scheme = if !view.scheme().is_empty() {
        view.scheme()
    } else if view.is_secure() {
        "https"
    } else {
        "http"
    };

    let mut url = if view.host().is_empty() {
        view.path().to_string()
    } else {
        [scheme, "://", view.host(), view.path()].concat()
    };

    if include_query && !view.query().is_empty() {
        url.push('?');
        match redact {
            Some(pattern) => url.push_str(&redact_query(view.query(), pattern)),
            None => url.push_str(view.query()),
        }
    }

    if !view.fragment().is_empty() {
        url.push('#');
        url.push_str(view.fragment());
    }

    url
}

/// Replaces every match of `pattern` in `query` with [`REDACTED`].
///
/// The replacement is literal: `$1`-style group references in the marker are
/// never expanded.
pub fn redact_query(query: &str, pattern: &Regex) -> String {
    pattern.replace_all(query, NoExpand(REDACTED)).into_owned()
}
