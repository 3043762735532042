//! Starting and finishing the span that covers one inbound request.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::client_ip::{ClientIpResolver, HeaderClientIpResolver};
use crate::config::TraceConfig;
use crate::naming::{NamingSchema, OperationKind, SchemaVersion};
use crate::request::RequestView;
use crate::request_url::reconstruct_url;
use crate::span::{
    FinishConfig, FinishOption, Span, SpanOption, StartSpanConfig, TagValue, Tracer, ext,
};
use crate::status::classify_status;

/// Request span lifecycle over a [`Tracer`].
///
/// Holds everything that is fixed for the lifetime of a server: the tracer,
/// the shared [`TraceConfig`], the naming schema and the client IP resolver.
/// One instance is shared by every request task.
///
/// ## Example
///
/// ```rust
/// use httptrace::testing::RecordingTracer;
/// use httptrace::{RequestSpans, RequestView, TraceConfig};
///
/// let tracer = RecordingTracer::new();
/// let spans = RequestSpans::new(tracer.clone(), TraceConfig::default());
///
/// let view = RequestView::builder()
///     .method("GET")
///     .host("example.com")
///     .path("/items")
///     .build();
/// let (span, _ctx) = spans.start_request_span(&view, []);
/// spans.finish_request_span(span, 200, None, []);
///
/// let finished = tracer.finished_spans();
/// assert_eq!(finished[0].tag_str("http.url"), Some("http://example.com/items"));
/// assert_eq!(finished[0].tag_str("http.status_code"), Some("200"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpans<T, N = SchemaVersion, C = HeaderClientIpResolver> {
    tracer: T,
    config: Arc<TraceConfig>,
    naming: N,
    client_ip: C,
}

impl<T: Tracer> RequestSpans<T> {
    /// Creates a lifecycle manager with the v0 naming schema and the
    /// forwarding-header client IP resolver.
    pub fn new(tracer: T, config: impl Into<Arc<TraceConfig>>) -> Self {
        Self {
            tracer,
            config: config.into(),
            naming: SchemaVersion::default(),
            client_ip: HeaderClientIpResolver::default(),
        }
    }
}

impl<T, N, C> RequestSpans<T, N, C>
where
    T: Tracer,
    N: NamingSchema,
    C: ClientIpResolver,
{
    /// Replaces the naming schema.
    pub fn with_naming<M: NamingSchema>(self, naming: M) -> RequestSpans<T, M, C> {
        RequestSpans {
            tracer: self.tracer,
            config: self.config,
            naming,
            client_ip: self.client_ip,
        }
    }

    /// Replaces the client IP resolver.
    pub fn with_client_ip_resolver<R: ClientIpResolver>(self, resolver: R) -> RequestSpans<T, N, R> {
        RequestSpans {
            tracer: self.tracer,
            config: self.config,
            naming: self.naming,
            client_ip: resolver,
        }
    }

    /// Returns the tracer.
    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Returns the shared configuration.
    pub fn config(&self) -> &Arc<TraceConfig> {
        &self.config
    }

    /// Returns the naming schema.
    pub fn naming(&self) -> &N {
        &self.naming
    }

    /// The options a request span starts with, before any caller options.
    ///
    /// In order: the standard request tags, span links and parent from the
    /// upstream context, then client IP tags when enabled.
    pub fn start_options(&self, view: &RequestView) -> Vec<SpanOption> {
        let url = reconstruct_url(
            view,
            self.config.query_string(),
            self.config.query_string_regexp(),
        );

        let mut tags: Vec<(String, TagValue)> = vec![
            (ext::SPAN_TYPE.to_string(), ext::SPAN_TYPE_WEB.into()),
            (ext::HTTP_METHOD.to_string(), view.method().into()),
            (ext::HTTP_URL.to_string(), url.into()),
            (ext::HTTP_USER_AGENT.to_string(), view.user_agent().into()),
            (ext::MEASURED.to_string(), 1i64.into()),
        ];
        if !view.host().is_empty() {
            tags.push((ext::HTTP_HOST.to_string(), view.host().into()));
        }
        let mut options = vec![SpanOption::Tags(tags)];

        match self.tracer.extract(view.headers()) {
            Ok(extracted) => {
                if let Some(links) = extracted.links {
                    options.push(SpanOption::SpanLinks(links));
                }
                options.push(SpanOption::ChildOf(extracted.context));
            }
            Err(err) => {
                debug!(error = %err, "no upstream trace context, starting root span");
            }
        }

        if self.config.trace_client_ip() {
            match self
                .client_ip
                .client_ip_tags(view.headers(), true, view.remote_addr())
            {
                Ok(ip_tags) => options.push(SpanOption::Tags(
                    ip_tags.into_iter().map(|(k, v)| (k, v.into())).collect(),
                )),
                Err(err) => {
                    debug!(error = %err, remote_addr = view.remote_addr(), "client ip not resolved");
                }
            }
        }

        options
    }

    /// Starts the span for an inbound request.
    ///
    /// `extra` is applied after the standard options, so a caller tag with a
    /// standard key replaces the standard value.
    pub fn start_request_span(
        &self,
        view: &RequestView,
        extra: impl IntoIterator<Item = SpanOption>,
    ) -> (T::Span, T::Context) {
        let mut options = self.start_options(view);
        options.extend(extra);
        let config = StartSpanConfig::from_options(options);

        let operation = self.naming.operation_name(OperationKind::HttpServer);
        trace!(
            operation = %operation,
            method = view.method(),
            child = config.parent().is_some(),
            "starting request span"
        );
        self.tracer.start_span(&operation, config)
    }

    /// Records the response status and finishes the span.
    ///
    /// `is_error` overrides the configured predicate for this call only.
    pub fn finish_request_span(
        &self,
        mut span: T::Span,
        status: u16,
        is_error: Option<&dyn Fn(u16) -> bool>,
        options: impl IntoIterator<Item = FinishOption>,
    ) {
        let outcome = match is_error {
            Some(predicate) => classify_status(status, predicate),
            None => classify_status(status, &|code| self.config.is_status_error(code)),
        };

        if outcome.is_error() {
            span.set_tag(ext::ERROR, outcome.error_message().into());
        }
        span.set_tag(ext::HTTP_CODE, outcome.display().into());
        trace!(status = outcome.display(), error = outcome.is_error(), "finishing request span");

        span.finish(FinishConfig::from_options(options));
    }
}
