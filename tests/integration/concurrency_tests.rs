//! Many request tasks sharing one lifecycle manager and header mapping.

use std::sync::Arc;

use anyhow::Result;
use httptrace::span::ext;
use httptrace::{HeaderTags, TraceConfig};

use crate::common::{TRACEPARENT, UPSTREAM_TRACE_ID, items_request, spans_with};

const TASKS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_request_spans() -> Result<()> {
    let (tracer, spans) = spans_with(TraceConfig::default().with_trace_client_ip(true));
    let spans = Arc::new(spans);
    let header_tags = Arc::new(HeaderTags::from_pairs([("X-Req-Id", "req.id")]));

    let mut handles = Vec::with_capacity(TASKS);
    for i in 0..TASKS {
        let spans = Arc::clone(&spans);
        let header_tags = Arc::clone(&header_tags);
        handles.push(tokio::spawn(async move {
            let id = i.to_string();
            let mut headers = vec![("X-Req-Id", id.as_str())];
            if i % 2 == 0 {
                headers.push(("traceparent", TRACEPARENT));
            }
            let view = items_request(&headers);

            let (span, _) = spans.start_request_span(&view, [header_tags.start_option(&view)]);
            let status = if i % 4 == 0 { 500 } else { 200 };
            spans.finish_request_span(span, status, None, []);
        }));
    }

    // Republish the mapping while requests are in flight.
    header_tags.set("X-Other", "other");

    for handle in handles {
        handle.await?;
    }

    let finished = tracer.finished_spans();
    assert_eq!(finished.len(), TASKS);

    let mut ids: Vec<usize> = finished
        .iter()
        .filter_map(|span| span.tag_str("req.id")?.parse().ok())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..TASKS).collect::<Vec<_>>());

    for span in &finished {
        let id: usize = span.tag_str("req.id").unwrap_or_default().parse()?;
        assert_eq!(span.parent().is_some(), id % 2 == 0);
        if let Some(parent) = span.parent() {
            assert_eq!(parent.trace_id().to_string(), UPSTREAM_TRACE_ID);
        }
        assert_eq!(span.is_error(), id % 4 == 0);
        assert_eq!(span.tag_str(ext::HTTP_CLIENT_IP), Some("198.51.100.20"));
    }

    assert_eq!(header_tags.len(), 2);
    Ok(())
}
