//! Ordered span start and finish options.

use std::time::SystemTime;

use crate::span::{SpanContext, SpanLink, SpanTagSet, TagValue};

/// One step in assembling a span before it starts.
///
/// Options are applied in order; a later `SetTag` for the same key replaces
/// an earlier one, which is how callers override the standard request tags.
///
/// ## Example
///
/// ```rust
/// use httptrace::span::{SpanOption, StartSpanConfig};
///
/// let config = StartSpanConfig::from_options([
///     SpanOption::tag("http.method", "GET"),
///     SpanOption::resource_name("GET /items"),
///     SpanOption::tag("http.method", "HEAD"),
/// ]);
/// assert_eq!(config.tags().get_str("http.method"), Some("HEAD"));
/// assert_eq!(config.resource_name(), Some("GET /items"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SpanOption {
    /// Set a single tag.
    SetTag(String, TagValue),
    /// Set several tags in order.
    Tags(Vec<(String, TagValue)>),
    /// Append span links.
    SpanLinks(Vec<SpanLink>),
    /// Make the span a child of the given context.
    ChildOf(SpanContext),
    /// Set the resource name.
    ResourceName(String),
    /// Set the service name.
    ServiceName(String),
    /// Override the start time.
    StartTime(SystemTime),
}

impl SpanOption {
    /// Shorthand for [`SpanOption::SetTag`].
    pub fn tag(key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        SpanOption::SetTag(key.into(), value.into())
    }

    /// Shorthand for [`SpanOption::ResourceName`].
    pub fn resource_name(name: impl Into<String>) -> Self {
        SpanOption::ResourceName(name.into())
    }

    /// Shorthand for [`SpanOption::ServiceName`].
    pub fn service_name(name: impl Into<String>) -> Self {
        SpanOption::ServiceName(name.into())
    }
}

/// The immutable result of folding a list of [`SpanOption`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartSpanConfig {
    tags: SpanTagSet,
    links: Vec<SpanLink>,
    parent: Option<SpanContext>,
    resource_name: Option<String>,
    service_name: Option<String>,
    start_time: Option<SystemTime>,
}

impl StartSpanConfig {
    /// Applies the options in order.
    pub fn from_options(options: impl IntoIterator<Item = SpanOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    fn apply(&mut self, option: SpanOption) {
        match option {
            SpanOption::SetTag(key, value) => self.tags.insert(key, value),
            SpanOption::Tags(tags) => self.tags.extend(tags),
            SpanOption::SpanLinks(links) => self.links.extend(links),
            SpanOption::ChildOf(parent) => self.parent = Some(parent),
            SpanOption::ResourceName(name) => self.resource_name = Some(name),
            SpanOption::ServiceName(name) => self.service_name = Some(name),
            SpanOption::StartTime(time) => self.start_time = Some(time),
        }
    }

    /// Tags to set on the span.
    pub fn tags(&self) -> &SpanTagSet {
        &self.tags
    }

    /// Span links to record.
    pub fn links(&self) -> &[SpanLink] {
        &self.links
    }

    /// Parent context, `None` for a root span.
    pub fn parent(&self) -> Option<&SpanContext> {
        self.parent.as_ref()
    }

    /// Resource name override.
    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    /// Service name override.
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Start time override.
    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }
}

/// An option applied when finishing a span.
#[derive(Debug, Clone, PartialEq)]
pub enum FinishOption {
    /// Override the finish time.
    FinishTime(SystemTime),
    /// Record an error message on the span.
    WithError(String),
}

/// The result of folding a list of [`FinishOption`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinishConfig {
    finish_time: Option<SystemTime>,
    error: Option<String>,
}

impl FinishConfig {
    /// Applies the options in order.
    pub fn from_options(options: impl IntoIterator<Item = FinishOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            match option {
                FinishOption::FinishTime(time) => config.finish_time = Some(time),
                FinishOption::WithError(message) => config.error = Some(message),
            }
        }
        config
    }

    /// Finish time override.
    pub fn finish_time(&self) -> Option<SystemTime> {
        self.finish_time
    }

    /// Error message to record, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
