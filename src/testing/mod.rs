//! Testing utilities for framework adapters.
//!
//! [`RecordingTracer`] implements [`Tracer`](crate::span::Tracer) in memory:
//! it extracts W3C `traceparent` / `tracestate` headers and keeps every
//! finished span so tests can assert on names, tags, parents and links.
//!
//! ## Quick Start
//!
//! ```rust
//! use httptrace::testing::RecordingTracer;
//! use httptrace::{RequestSpans, RequestView, TraceConfig};
//!
//! let tracer = RecordingTracer::new();
//! let spans = RequestSpans::new(tracer.clone(), TraceConfig::default());
//!
//! let view = RequestView::builder().method("POST").path("/orders").build();
//! let (span, _ctx) = spans.start_request_span(&view, []);
//! spans.finish_request_span(span, 500, None, []);
//!
//! let span = tracer.last_finished().unwrap();
//! assert!(span.is_error());
//! assert_eq!(span.tag_str("http.method"), Some("POST"));
//! ```

mod recording;

pub use recording::{FinishedSpan, RecordingSpan, RecordingTracer};
