//! # httptrace
//!
//! Request span core for HTTP servers: decides what goes into the span that
//! covers one inbound request, and leaves span storage, sampling and
//! propagation wire formats to a [`Tracer`](span::Tracer) implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use httptrace::prelude::*;
//! use httptrace::testing::RecordingTracer;
//!
//! # fn main() -> httptrace::Result<()> {
//! let config = TraceConfig::default().with_query_string_pattern(r"token=\w+")?;
//! let tracer = RecordingTracer::new();
//! let spans = RequestSpans::new(tracer.clone(), config);
//!
//! let url = url::Url::parse("https://example.com/items?token=abc#frag").unwrap();
//! let view = RequestView::from_url("GET", &url);
//!
//! let (span, _ctx) = spans.start_request_span(&view, [SpanOption::resource_name("GET /items")]);
//! spans.finish_request_span(span, 200, None, []);
//!
//! let span = tracer.last_finished().unwrap();
//! assert_eq!(span.tag_str("http.url"), Some("https://example.com/items?<redacted>#frag"));
//! assert_eq!(span.tag_str("http.status_code"), Some("200"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! - **Injected configuration**: [`TraceConfig`] is built once (usually with
//!   [`TraceConfig::from_env`]) and shared through an `Arc`; nothing is global.
//! - **Ordered options**: span starts are described by a list of
//!   [`SpanOption`](span::SpanOption)s; caller options go last and win.
//! - **Ownership as lifecycle**: [`Span::finish`](span::Span::finish) consumes
//!   the span.
//! - **Recovered failures**: a missing or malformed upstream trace context
//!   yields a root span; an unresolvable client IP yields no IP tags.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`request`] | [`RequestView`], [`HeaderMap`] |
//! | [`request_url`] | URL reconstruction and query redaction |
//! | [`status`] | status classification |
//! | [`header_tags`] | header to tag mapping |
//! | [`lifecycle`] | [`RequestSpans`] |
//! | [`client_ip`] | client IP resolution |
//! | [`naming`] | operation names |
//! | [`span`] | tracer interfaces and span values |
//! | [`testing`] | in-memory tracer |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod config;
pub mod error;
pub mod request;
pub mod span;

// Request span building blocks
pub mod client_ip;
pub mod header_tags;
pub mod naming;
pub mod request_url;
pub mod status;

// Lifecycle
pub mod lifecycle;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use client_ip::{ClientIpResolver, HeaderClientIpResolver};
pub use config::{StatusErrorPredicate, TraceConfig};
pub use error::{Error, ErrorKind, Result};
pub use header_tags::{HeaderTags, extract_header_tags};
pub use lifecycle::RequestSpans;
pub use naming::{NamingSchema, OperationKind, SchemaVersion};
pub use request::{HeaderMap, RequestView};
pub use request_url::{REDACTED, reconstruct_url, redact_query};
pub use status::{StatusOutcome, classify_status, is_server_error, status_text};
