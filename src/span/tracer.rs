//! Interfaces of the tracer this crate feeds.
//!
//! The tracer owns span allocation, timing, sampling and propagation wire
//! formats. This crate only decides what goes into a span.

use crate::request::HeaderMap;
use crate::span::{ExtractError, ExtractedContext, FinishConfig, StartSpanConfig, TagValue};

/// A started span.
///
/// `finish` consumes the span, so a span cannot be finished twice.
pub trait Span {
    /// Sets a tag, replacing any previous value.
    fn set_tag(&mut self, key: &str, value: TagValue);

    /// Finishes the span.
    fn finish(self, config: FinishConfig);
}

/// A tracer capable of extracting upstream context and starting spans.
///
/// Implementations must be usable from many request tasks at once.
pub trait Tracer: Send + Sync {
    /// The span type produced by this tracer.
    type Span: Span;

    /// Context handed back alongside the span, for the caller to propagate
    /// into the request's handler.
    type Context;

    /// Extracts the upstream trace context from request headers.
    fn extract(&self, headers: &HeaderMap) -> Result<ExtractedContext, ExtractError>;

    /// Starts a span.
    fn start_span(&self, operation_name: &str, config: StartSpanConfig) -> (Self::Span, Self::Context);
}
