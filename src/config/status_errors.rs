//! Which response statuses mark a request span as an error.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::warn;

/// Predicate deciding whether a response status is an error.
///
/// Defaults to the 5xx range. Ranges are parsed from the
/// `DD_TRACE_HTTP_SERVER_ERROR_STATUSES` format: comma-separated codes or
/// inclusive `low-high` ranges.
///
/// ## Example
///
/// ```rust
/// use httptrace::StatusErrorPredicate;
///
/// let predicate = StatusErrorPredicate::parse("0,404,500-599").unwrap();
/// assert!(predicate.is_error(0));
/// assert!(predicate.is_error(404));
/// assert!(predicate.is_error(502));
/// assert!(!predicate.is_error(403));
///
/// let predicate = StatusErrorPredicate::from_fn(|status| status == 429);
/// assert!(predicate.is_error(429));
/// ```
#[derive(Clone)]
pub struct StatusErrorPredicate {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Ranges(Vec<RangeInclusive<u16>>),
    Custom(Arc<dyn Fn(u16) -> bool + Send + Sync>),
}

impl Default for StatusErrorPredicate {
    /// Default: 500-599 are errors.
    fn default() -> Self {
        Self::from_ranges([500..=599])
    }
}

impl StatusErrorPredicate {
    /// Creates a predicate matching any of the given inclusive ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = RangeInclusive<u16>>) -> Self {
        Self {
            inner: Inner::Ranges(ranges.into_iter().collect()),
        }
    }

    /// Creates a predicate from an arbitrary function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Custom(Arc::new(f)),
        }
    }

    /// Parses a list such as `"500-599,404"`.
    ///
    /// Invalid entries are skipped with a warning. Returns `None` when no
    /// entry is valid, leaving the caller to keep its current predicate.
    pub fn parse(input: &str) -> Option<Self> {
        let mut ranges = Vec::new();
        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match parse_entry(entry) {
                Some(range) => ranges.push(range),
                None => warn!(entry, "ignoring invalid HTTP error status entry"),
            }
        }
        if ranges.is_empty() {
            None
        } else {
            Some(Self::from_ranges(ranges))
        }
    }

    /// Returns `true` if the status is an error.
    pub fn is_error(&self, status: u16) -> bool {
        match &self.inner {
            Inner::Ranges(ranges) => ranges.iter().any(|range| range.contains(&status)),
            Inner::Custom(f) => f(status),
        }
    }

    /// The configured ranges, or `None` for a custom function.
    pub fn ranges(&self) -> Option<&[RangeInclusive<u16>]> {
        match &self.inner {
            Inner::Ranges(ranges) => Some(ranges),
            Inner::Custom(_) => None,
        }
    }
}

fn parse_entry(entry: &str) -> Option<RangeInclusive<u16>> {
    match entry.split_once('-') {
        Some((low, high)) => {
            let low = low.trim().parse::<u16>().ok()?;
            let high = high.trim().parse::<u16>().ok()?;
            (low <= high).then_some(low..=high)
        }
        None => {
            let code = entry.parse::<u16>().ok()?;
            Some(code..=code)
        }
    }
}

impl fmt::Debug for StatusErrorPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Ranges(ranges) => f.debug_tuple("StatusErrorPredicate").field(ranges).finish(),
            Inner::Custom(_) => f.write_str("StatusErrorPredicate(<fn>)"),
        }
    }
}
