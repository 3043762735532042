//! In-memory tracer that records finished spans.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::request::HeaderMap;
use crate::span::{
    ExtractError, ExtractedContext, FinishConfig, Span, SpanContext, SpanId, SpanLink, SpanTagSet,
    StartSpanConfig, TagValue, TraceFlags, TraceId, Tracer, ext,
};

const TRACEPARENT: &str = "traceparent";
const TRACESTATE: &str = "tracestate";

/// A tracer that keeps every finished span in memory.
///
/// Clones share the same span store, so a test can hand one clone to
/// [`RequestSpans`](crate::RequestSpans) and inspect the spans through
/// another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    finished: Arc<RwLock<Vec<FinishedSpan>>>,
    extracted: Option<ExtractedContext>,
}

impl RecordingTracer {
    /// Creates a tracer that extracts W3C trace context headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every extraction return `extracted`, ignoring request headers.
    #[must_use]
    pub fn with_extracted(mut self, extracted: ExtractedContext) -> Self {
        self.extracted = Some(extracted);
        self
    }

    /// Returns a copy of all finished spans, in finish order.
    pub fn finished_spans(&self) -> Vec<FinishedSpan> {
        self.finished.read().clone()
    }

    /// Returns the most recently finished span.
    pub fn last_finished(&self) -> Option<FinishedSpan> {
        self.finished.read().last().cloned()
    }

    /// Number of finished spans.
    pub fn finished_count(&self) -> usize {
        self.finished.read().len()
    }

    /// Discards all finished spans.
    pub fn clear(&self) {
        self.finished.write().clear();
    }
}

impl Tracer for RecordingTracer {
    type Span = RecordingSpan;
    type Context = SpanContext;

    fn extract(&self, headers: &HeaderMap) -> Result<ExtractedContext, ExtractError> {
        if let Some(extracted) = &self.extracted {
            return Ok(extracted.clone());
        }

        let traceparent = headers
            .get(TRACEPARENT)
            .ok_or(ExtractError::Missing)?;
        let mut context = parse_traceparent(traceparent)?;
        if let Some(state) = headers.get(TRACESTATE) {
            context = context.with_tracestate(state);
        }
        Ok(ExtractedContext::new(context))
    }

    fn start_span(&self, operation_name: &str, config: StartSpanConfig) -> (RecordingSpan, SpanContext) {
        let context = match config.parent() {
            Some(parent) => parent.child(),
            None => SpanContext::new_root(),
        };
        let span = RecordingSpan {
            name: operation_name.to_string(),
            tags: config.tags().clone(),
            context: context.clone(),
            config,
            started: Instant::now(),
            sink: Arc::clone(&self.finished),
        };
        (span, context)
    }
}

/// Parses a version `00` traceparent: `00-<trace id>-<span id>-<flags>`.
fn parse_traceparent(value: &str) -> Result<SpanContext, ExtractError> {
    let parts: Vec<&str> = value.trim().split('-').collect();
    if parts.len() != 4 {
        return Err(ExtractError::malformed("traceparent must have 4 fields"));
    }
    if parts[0] != "00" {
        return Err(ExtractError::malformed("unsupported traceparent version"));
    }

    let trace_id = TraceId::from_hex(parts[1])?;
    let span_id = SpanId::from_hex(parts[2])?;

    let mut flags = [0u8; 1];
    if parts[3].len() != 2 {
        return Err(ExtractError::malformed("trace flags must be 2 hex digits"));
    }
    hex::decode_to_slice(parts[3], &mut flags)
        .map_err(|_| ExtractError::malformed("trace flags are not hex"))?;

    let sampled = TraceFlags::from_u8(flags[0]).is_sampled();
    Ok(SpanContext::new(trace_id, span_id).with_sampled(sampled))
}

/// A span started by [`RecordingTracer`] and not yet finished.
#[derive(Debug)]
pub struct RecordingSpan {
    name: String,
    tags: SpanTagSet,
    context: SpanContext,
    config: StartSpanConfig,
    started: Instant,
    sink: Arc<RwLock<Vec<FinishedSpan>>>,
}

impl RecordingSpan {
    /// Returns the operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the span's own context.
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Returns the tags set so far.
    pub fn tags(&self) -> &SpanTagSet {
        &self.tags
    }
}

impl Span for RecordingSpan {
    fn set_tag(&mut self, key: &str, value: TagValue) {
        self.tags.insert(key, value);
    }

    fn finish(self, config: FinishConfig) {
        let finished = FinishedSpan {
            name: self.name,
            tags: self.tags,
            context: self.context,
            start: self.config,
            finish: config,
            duration: self.started.elapsed(),
        };
        self.sink.write().push(finished);
    }
}

/// A completed span as recorded by [`RecordingTracer`].
#[derive(Debug, Clone)]
pub struct FinishedSpan {
    name: String,
    tags: SpanTagSet,
    context: SpanContext,
    start: StartSpanConfig,
    finish: FinishConfig,
    duration: Duration,
}

impl FinishedSpan {
    /// Returns the operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all tags, including those set at finish.
    pub fn tags(&self) -> &SpanTagSet {
        &self.tags
    }

    /// Returns a tag value.
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    /// Returns a string tag value.
    pub fn tag_str(&self, key: &str) -> Option<&str> {
        self.tags.get_str(key)
    }

    /// Returns the span's own context.
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Returns the parent context, `None` for a root span.
    pub fn parent(&self) -> Option<&SpanContext> {
        self.start.parent()
    }

    /// Returns the span links recorded at start.
    pub fn links(&self) -> &[SpanLink] {
        self.start.links()
    }

    /// Returns the resource name, if set.
    pub fn resource_name(&self) -> Option<&str> {
        self.start.resource_name()
    }

    /// Returns the service name, if set.
    pub fn service_name(&self) -> Option<&str> {
        self.start.service_name()
    }

    /// Returns the options the span was finished with.
    pub fn finish_config(&self) -> &FinishConfig {
        &self.finish
    }

    /// Returns the wall-clock time between start and finish.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns `true` if the span carries an `error` tag.
    pub fn is_error(&self) -> bool {
        self.tags.contains_key(ext::ERROR)
    }
}
