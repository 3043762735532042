//! Request headers recorded as span tags.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::warn;

use crate::request::RequestView;
use crate::span::{SpanOption, ext};

/// Comma-separated `Header[:tag]` list of headers to record as tags.
pub const ENV_HEADER_TAGS: &str = "DD_TRACE_HEADER_TAGS";

/// Ordered mapping from request header name to span tag name.
///
/// Shared by every request. Readers take a snapshot without locking;
/// updates build a new list and publish it atomically, so a request never
/// sees a half-applied change.
///
/// ## Example
///
/// ```rust
/// use httptrace::{HeaderTags, RequestView, HeaderMap};
///
/// let tags = HeaderTags::from_pairs([("X-Req-Id", "req.id")]);
/// let headers: HeaderMap = vec![("X-Req-Id", " a "), ("X-Req-Id", "b")].into_iter().collect();
/// let view = RequestView::builder().headers(headers).build();
///
/// assert_eq!(tags.extract(&view), vec![("req.id".to_string(), "a ,b".to_string())]);
/// ```
pub struct HeaderTags {
    entries: ArcSwap<Vec<(String, String)>>,
}

impl HeaderTags {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::from_pairs(Vec::<(String, String)>::new())
    }

    /// Creates a mapping from `(header, tag)` pairs, keeping their order.
    pub fn from_pairs<H, T>(pairs: impl IntoIterator<Item = (H, T)>) -> Self
    where
        H: Into<String>,
        T: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(header, tag)| (header.into(), tag.into()))
            .collect::<Vec<_>>();
        Self {
            entries: ArcSwap::from_pointee(entries),
        }
    }

    /// Parses a `Header[:tag],...` list.
    ///
    /// Entries without a tag get `http.request.headers.<normalized header>`.
    ///
    /// ```rust
    /// use httptrace::HeaderTags;
    ///
    /// let tags = HeaderTags::parse("X-Req-Id:req.id, X-Amz.Id");
    /// let entries = tags.snapshot();
    /// assert_eq!(entries[0], ("X-Req-Id".to_string(), "req.id".to_string()));
    /// assert_eq!(entries[1], ("X-Amz.Id".to_string(), "http.request.headers.x-amz_id".to_string()));
    /// ```
    pub fn parse(input: &str) -> Self {
        let mut pairs = Vec::new();
        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (header, tag) = match entry.split_once(':') {
                Some((header, tag)) => (header.trim(), tag.trim()),
                None => (entry, ""),
            };
            if header.is_empty() {
                warn!(entry, "ignoring header tag entry without a header name");
                continue;
            }
            let tag = if tag.is_empty() {
                default_tag_name(header)
            } else {
                tag.to_string()
            };
            pairs.push((header.to_string(), tag));
        }
        Self::from_pairs(pairs)
    }

    /// Reads the mapping from `DD_TRACE_HEADER_TAGS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the mapping from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(ENV_HEADER_TAGS)
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    /// Maps `header` to `tag`, replacing an existing entry for the same
    /// header (compared ignoring case) in place or appending a new one.
    pub fn set(&self, header: impl Into<String>, tag: impl Into<String>) {
        let header = header.into();
        let tag = tag.into();
        self.entries.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter_mut().find(|(h, _)| h.eq_ignore_ascii_case(&header)) {
                Some(entry) => entry.1 = tag.clone(),
                None => next.push((header.clone(), tag.clone())),
            }
            next
        });
    }

    /// Removes the entry for `header`, compared ignoring case, if any.
    pub fn remove(&self, header: &str) {
        self.entries.rcu(|current| {
            current
                .iter()
                .filter(|(h, _)| !h.eq_ignore_ascii_case(header))
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    /// Replaces the whole mapping.
    pub fn replace<H, T>(&self, pairs: impl IntoIterator<Item = (H, T)>)
    where
        H: Into<String>,
        T: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(header, tag)| (header.into(), tag.into()))
            .collect::<Vec<_>>();
        self.entries.store(Arc::new(entries));
    }

    /// Returns the current entries.
    pub fn snapshot(&self) -> Arc<Vec<(String, String)>> {
        self.entries.load_full()
    }

    /// Number of configured headers.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Returns `true` if no headers are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Shorthand for [`extract_header_tags`].
    pub fn extract(&self, view: &RequestView) -> Vec<(String, String)> {
        extract_header_tags(view, self)
    }

    /// The extracted tags as one span start option.
    pub fn start_option(&self, view: &RequestView) -> SpanOption {
        SpanOption::Tags(
            self.extract(view)
                .into_iter()
                .map(|(tag, value)| (tag, value.into()))
                .collect(),
        )
    }
}

impl Default for HeaderTags {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HeaderTags {
    fn clone(&self) -> Self {
        Self {
            entries: ArcSwap::new(self.entries.load_full()),
        }
    }
}

impl fmt::Debug for HeaderTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderTags")
            .field("entries", &self.snapshot())
            .finish()
    }
}

/// Produces `(tag, value)` pairs for configured headers present on the
/// request, in mapping order.
///
/// Header names match whatever casing the transport used, since
/// [`HeaderMap`](crate::HeaderMap) stores them in lowercase. Multiple values
/// are joined with `,` and only the outer whitespace of the joined string is
/// trimmed. Absent headers produce nothing.
pub fn extract_header_tags(view: &RequestView, mapping: &HeaderTags) -> Vec<(String, String)> {
    let entries = mapping.entries.load();
    entries
        .iter()
        .filter_map(|(header, tag)| {
            let joined = view.headers().get_joined(header)?;
            Some((tag.clone(), joined.trim().to_string()))
        })
        .collect()
}

/// Default tag name for a header: `http.request.headers.` followed by the
/// lowercased header with characters outside `[a-z0-9_-]` replaced by `_`.
pub fn default_tag_name(header: &str) -> String {
    let normalized: String = header
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", ext::HTTP_REQUEST_HEADERS_PREFIX, normalized)
}
