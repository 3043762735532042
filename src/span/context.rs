//! Trace identity and the result of upstream context extraction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// The identity of a span, as handed to or produced by a tracer.
///
/// ## Example
///
/// ```rust
/// use httptrace::span::SpanContext;
///
/// let root = SpanContext::new_root();
/// let child = root.child();
/// assert_eq!(child.trace_id(), root.trace_id());
/// assert_ne!(child.span_id(), root.span_id());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    /// The trace ID (16 bytes).
    trace_id: TraceId,
    /// The span ID (8 bytes).
    span_id: SpanId,
    /// Trace flags.
    flags: TraceFlags,
    /// Vendor-specific propagated state.
    tracestate: Option<String>,
}

impl SpanContext {
    /// Creates a new root context with random IDs.
    pub fn new_root() -> Self {
        Self::new(TraceId::random(), SpanId::random())
    }

    /// Creates a context with the given trace and span IDs.
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            flags: TraceFlags::SAMPLED,
            tracestate: None,
        }
    }

    /// Creates a context for a new span in the same trace.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: SpanId::random(),
            flags: self.flags,
            tracestate: self.tracestate.clone(),
        }
    }

    /// Returns the trace ID.
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns the span ID.
    pub fn span_id(&self) -> &SpanId {
        &self.span_id
    }

    /// Returns the trace flags.
    pub fn flags(&self) -> TraceFlags {
        self.flags
    }

    /// Returns `true` if the sampled flag is set.
    pub fn is_sampled(&self) -> bool {
        self.flags.is_sampled()
    }

    /// Sets the tracestate value.
    #[must_use]
    pub fn with_tracestate(mut self, tracestate: impl Into<String>) -> Self {
        self.tracestate = Some(tracestate.into());
        self
    }

    /// Returns the tracestate value, if any.
    pub fn tracestate(&self) -> Option<&str> {
        self.tracestate.as_deref()
    }

    /// Sets the sampled flag.
    #[must_use]
    pub fn with_sampled(mut self, sampled: bool) -> Self {
        if sampled {
            self.flags = self.flags | TraceFlags::SAMPLED;
        } else {
            self.flags = TraceFlags(self.flags.0 & !TraceFlags::SAMPLED.0);
        }
        self
    }
}

/// A 128-bit trace identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TraceId([u8; 16]);

impl TraceId {
    /// Creates a new random, non-zero trace ID.
    pub fn random() -> Self {
        Self(fastrand::u128(1..).to_be_bytes())
    }

    /// Creates a trace ID from bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a trace ID from a 32 character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ExtractError> {
        if hex.len() != 32 {
            return Err(ExtractError::malformed("trace id must be 32 hex digits"));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| ExtractError::malformed("trace id is not hex"))?;

        if bytes == [0u8; 16] {
            return Err(ExtractError::malformed("trace id is all zeros"));
        }

        Ok(Self(bytes))
    }

    /// Returns the trace ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for TraceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A 64-bit span identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SpanId([u8; 8]);

impl SpanId {
    /// Creates a new random, non-zero span ID.
    pub fn random() -> Self {
        Self(fastrand::u64(1..).to_be_bytes())
    }

    /// Creates a span ID from bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Creates a span ID from a 16 character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ExtractError> {
        if hex.len() != 16 {
            return Err(ExtractError::malformed("span id must be 16 hex digits"));
        }
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| ExtractError::malformed("span id is not hex"))?;

        if bytes == [0u8; 8] {
            return Err(ExtractError::malformed("span id is all zeros"));
        }

        Ok(Self(bytes))
    }

    /// Returns the span ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({})", self)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for SpanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Trace flags as defined by W3C Trace Context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The trace is sampled.
    pub const SAMPLED: Self = Self(0x01);

    /// Creates trace flags from the raw byte.
    pub fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Returns `true` if the sampled flag is set.
    pub fn is_sampled(&self) -> bool {
        self.0 & Self::SAMPLED.0 != 0
    }

    /// Returns the raw flag value.
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for TraceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// A non-parent relationship from the new span to another span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanLink {
    trace_id: TraceId,
    span_id: SpanId,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracestate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<u32>,
}

impl SpanLink {
    /// Creates a link to the given span.
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            attributes: BTreeMap::new(),
            tracestate: None,
            flags: None,
        }
    }

    /// Creates a link pointing at an existing context.
    pub fn to_context(context: &SpanContext) -> Self {
        let mut link = Self::new(context.trace_id().clone(), context.span_id().clone());
        link.tracestate = context.tracestate().map(str::to_string);
        link.flags = Some(u32::from(context.flags().as_u8()));
        link
    }

    /// Adds a link attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the linked trace ID.
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns the linked span ID.
    pub fn span_id(&self) -> &SpanId {
        &self.span_id
    }

    /// Returns the link attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Upstream trace context recovered from request headers.
///
/// `links` is always present as a field; a propagator that produces no links
/// leaves it `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContext {
    /// The upstream span the new span becomes a child of.
    pub context: SpanContext,
    /// Span links recovered alongside the parent, if the propagator produced any.
    pub links: Option<Vec<SpanLink>>,
}

impl ExtractedContext {
    /// Wraps an upstream context without links.
    pub fn new(context: SpanContext) -> Self {
        Self {
            context,
            links: None,
        }
    }

    /// Attaches span links.
    #[must_use]
    pub fn with_links(mut self, links: Vec<SpanLink>) -> Self {
        self.links = Some(links);
        self
    }
}

impl From<SpanContext> for ExtractedContext {
    fn from(context: SpanContext) -> Self {
        Self::new(context)
    }
}

/// Why no upstream context could be extracted.
///
/// Never fatal: the request span simply becomes a root span.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// No propagation headers were present.
    #[error("no trace context headers present")]
    Missing,
    /// Propagation headers were present but could not be parsed.
    #[error("malformed trace context: {0}")]
    Malformed(String),
}

impl ExtractError {
    /// Creates a [`ExtractError::Malformed`] error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ExtractError::Malformed(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_context_new_root() {
        let ctx = SpanContext::new_root();
        assert!(ctx.is_sampled());
        assert!(ctx.tracestate().is_none());
    }

    #[test]
    fn test_span_context_child() {
        let parent = SpanContext::new_root().with_tracestate("vendor=value");
        let child = parent.child();

        assert_eq!(child.trace_id(), parent.trace_id());
        assert_ne!(child.span_id(), parent.span_id());
        assert_eq!(child.tracestate(), Some("vendor=value"));
    }

    #[test]
    fn test_span_context_with_sampled() {
        let ctx = SpanContext::new_root().with_sampled(false);
        assert!(!ctx.is_sampled());

        let ctx = ctx.with_sampled(true);
        assert!(ctx.is_sampled());
    }

    #[test]
    fn test_trace_id_from_hex() {
        let id = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
        assert_eq!(id.to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
    }

    #[test]
    fn test_trace_id_invalid() {
        assert!(TraceId::from_hex("00000000000000000000000000000000").is_err());
        assert!(TraceId::from_hex("abc").is_err());
        assert!(TraceId::from_hex("zzf92f3577b34da6a3ce929d0e0e4736").is_err());
    }

    #[test]
    fn test_span_id_from_hex() {
        let id = SpanId::from_hex("00f067aa0ba902b7").unwrap();
        assert_eq!(id.to_string(), "00f067aa0ba902b7");
        assert!(SpanId::from_hex("0000000000000000").is_err());
    }

    #[test]
    fn test_random_ids_are_non_zero() {
        for _ in 0..100 {
            assert_ne!(TraceId::random().as_bytes(), &[0u8; 16]);
            assert_ne!(SpanId::random().as_bytes(), &[0u8; 8]);
        }
    }

    #[test]
    fn test_trace_flags() {
        assert!(!TraceFlags::NONE.is_sampled());
        assert!(TraceFlags::SAMPLED.is_sampled());
        assert!((TraceFlags::NONE | TraceFlags::SAMPLED).is_sampled());
        assert_eq!(TraceFlags::from_u8(0x03).as_u8(), 3);
    }

    #[test]
    fn test_span_link_to_context() {
        let ctx = SpanContext::new_root().with_tracestate("dd=s:1");
        let link = SpanLink::to_context(&ctx).with_attribute("reason", "terminated_context");

        assert_eq!(link.trace_id(), ctx.trace_id());
        assert_eq!(link.span_id(), ctx.span_id());
        assert_eq!(
            link.attributes().get("reason").map(String::as_str),
            Some("terminated_context")
        );

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["tracestate"], "dd=s:1");
        assert_eq!(json["flags"], 1);
    }

    #[test]
    fn test_extracted_context_links_default_none() {
        let extracted = ExtractedContext::from(SpanContext::new_root());
        assert!(extracted.links.is_none());

        let link = SpanLink::to_context(&SpanContext::new_root());
        let extracted = extracted.with_links(vec![link]);
        assert_eq!(extracted.links.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_extract_error_display() {
        assert_eq!(
            ExtractError::Missing.to_string(),
            "no trace context headers present"
        );
        assert_eq!(
            ExtractError::malformed("bad version").to_string(),
            "malformed trace context: bad version"
        );
    }
}
