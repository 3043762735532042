//! Prelude module for convenient imports.
//!
//! ```rust
//! use httptrace::prelude::*;
//! ```
//!
//! This provides access to:
//! - The lifecycle manager and its configuration
//! - Request snapshots
//! - Tracer interfaces and span options
//! - Error types

pub use crate::{
    client_ip::{ClientIpResolver, HeaderClientIpResolver},
    config::{StatusErrorPredicate, TraceConfig},
    error::{Error, ErrorKind, Result},
    header_tags::HeaderTags,
    lifecycle::RequestSpans,
    naming::{NamingSchema, OperationKind, SchemaVersion},
    request::{HeaderMap, RequestView},
    span::{
        ExtractError, ExtractedContext, FinishOption, Span, SpanContext, SpanLink, SpanOption,
        TagValue, Tracer,
    },
};
