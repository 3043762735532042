//! Standard tag names and values set on HTTP server spans.

/// Span type tag.
pub const SPAN_TYPE: &str = "span.type";
/// Span type value for inbound web requests.
pub const SPAN_TYPE_WEB: &str = "web";
/// HTTP request method.
pub const HTTP_METHOD: &str = "http.method";
/// Reconstructed (and possibly redacted) request URL.
pub const HTTP_URL: &str = "http.url";
/// Request `User-Agent`.
pub const HTTP_USER_AGENT: &str = "http.useragent";
/// Request host, only set when known.
pub const HTTP_HOST: &str = "http.host";
/// Response status as displayed (`"0"` or `"200"` for an unset status).
pub const HTTP_CODE: &str = "http.status_code";
/// Marks the span for trace metrics computation.
pub const MEASURED: &str = "_dd.measured";
/// Error message, set when the status is classified as an error.
pub const ERROR: &str = "error";
/// Resolved client IP.
pub const HTTP_CLIENT_IP: &str = "http.client_ip";
/// Peer address of the connection.
pub const NETWORK_CLIENT_IP: &str = "network.client.ip";
/// Prefix for tags derived from request headers.
pub const HTTP_REQUEST_HEADERS_PREFIX: &str = "http.request.headers.";
