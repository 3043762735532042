//! Environment-driven configuration feeding the request span.

use std::collections::HashMap;

use anyhow::{Context, Result};
use httptrace::config::{
    ENV_CLIENT_IP_ENABLED, ENV_QUERY_STRING_DISABLED, ENV_QUERY_STRING_REGEXP,
    ENV_SERVER_ERROR_STATUSES,
};
use httptrace::header_tags::ENV_HEADER_TAGS;
use httptrace::naming::ENV_SPAN_ATTRIBUTE_SCHEMA;
use httptrace::span::ext;
use httptrace::{ErrorKind, HeaderTags, SchemaVersion, TraceConfig};

use crate::common::{items_request, spans_with};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_env_configured_span() -> Result<()> {
    let lookup = env(&[
        (ENV_CLIENT_IP_ENABLED, "true"),
        (ENV_QUERY_STRING_REGEXP, ""),
        (ENV_SERVER_ERROR_STATUSES, "404,500-599"),
    ]);
    let (tracer, spans) = spans_with(TraceConfig::from_lookup(&lookup)?);

    let (span, _) = spans.start_request_span(&items_request(&[]), []);
    spans.finish_request_span(span, 404, None, []);

    let span = tracer.last_finished().context("no span recorded")?;
    assert_eq!(span.tag_str(ext::HTTP_URL), Some("https://example.com/items?token=abc#frag"));
    assert_eq!(span.tag_str(ext::HTTP_CLIENT_IP), Some("198.51.100.20"));
    assert_eq!(span.tag_str(ext::ERROR), Some("404: Not Found"));
    Ok(())
}

#[test]
fn test_env_query_string_disabled() -> Result<()> {
    let config = TraceConfig::from_lookup(env(&[(ENV_QUERY_STRING_DISABLED, "1")]))?;
    let (tracer, spans) = spans_with(config);

    let (span, _) = spans.start_request_span(&items_request(&[]), []);
    spans.finish_request_span(span, 200, None, []);

    let span = tracer.last_finished().context("no span recorded")?;
    assert_eq!(span.tag_str(ext::HTTP_URL), Some("https://example.com/items#frag"));
    Ok(())
}

#[test]
fn test_env_invalid_pattern_rejected() {
    let err = TraceConfig::from_lookup(env(&[(ENV_QUERY_STRING_REGEXP, "[z-a]")])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_env_header_tags_and_schema() {
    let lookup = env(&[
        (ENV_HEADER_TAGS, "X-Req-Id:req.id"),
        (ENV_SPAN_ATTRIBUTE_SCHEMA, "v1"),
    ]);
    let header_tags = HeaderTags::from_lookup(&lookup);
    let view = items_request(&[("X-Req-Id", "42")]);

    assert_eq!(header_tags.extract(&view), vec![("req.id".to_string(), "42".to_string())]);
    assert_eq!(SchemaVersion::from_lookup(&lookup), SchemaVersion::V1);
}
