//! Common fixtures for the integration tests.

use std::sync::Once;

use httptrace::testing::RecordingTracer;
use httptrace::{HeaderMap, RequestSpans, RequestView, TraceConfig};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// W3C traceparent used across tests.
pub const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

/// Upstream trace ID encoded in [`TRACEPARENT`].
pub const UPSTREAM_TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";

/// Installs a test subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A lifecycle manager over a fresh recording tracer.
pub fn spans_with(config: TraceConfig) -> (RecordingTracer, RequestSpans<RecordingTracer>) {
    init_tracing();
    let tracer = RecordingTracer::new();
    let spans = RequestSpans::new(tracer.clone(), config);
    (tracer, spans)
}

/// `GET https://example.com/items?token=abc#frag` with the given headers.
pub fn items_request(headers: &[(&str, &str)]) -> RequestView {
    let headers: HeaderMap = headers.iter().copied().collect();
    RequestView::builder()
        .method("GET")
        .scheme("https")
        .host("example.com")
        .path("/items")
        .query("token=abc")
        .fragment("frag")
        .headers(headers)
        .remote_addr("198.51.100.20:51000")
        .secure(true)
        .build()
}
