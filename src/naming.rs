//! Operation names for spans, by naming schema version.

use std::fmt;

use tracing::warn;

/// Selects the naming schema version (`v0` or `v1`).
pub const ENV_SPAN_ATTRIBUTE_SCHEMA: &str = "DD_TRACE_SPAN_ATTRIBUTE_SCHEMA";

/// The kind of operation a span represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// An inbound HTTP request handled by this process.
    HttpServer,
    /// An outbound HTTP request made by this process.
    HttpClient,
}

/// Resolves the operation name for a kind of span.
pub trait NamingSchema: Send + Sync {
    /// Returns the operation name for `kind`.
    fn operation_name(&self, kind: OperationKind) -> String;
}

impl<F> NamingSchema for F
where
    F: Fn(OperationKind) -> String + Send + Sync,
{
    fn operation_name(&self, kind: OperationKind) -> String {
        self(kind)
    }
}

/// Built-in naming schema versions.
///
/// | Kind         | v0             | v1                    |
/// |--------------|----------------|-----------------------|
/// | `HttpServer` | `http.request` | `http.server.request` |
/// | `HttpClient` | `http.request` | `http.client.request` |
///
/// ```rust
/// use httptrace::{NamingSchema, OperationKind, SchemaVersion};
///
/// assert_eq!(SchemaVersion::V0.operation_name(OperationKind::HttpServer), "http.request");
/// assert_eq!(SchemaVersion::V1.operation_name(OperationKind::HttpServer), "http.server.request");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Legacy names.
    #[default]
    V0,
    /// Names that distinguish server and client spans.
    V1,
}

impl SchemaVersion {
    /// Parses `v0` / `v1` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v0" => Some(SchemaVersion::V0),
            "v1" => Some(SchemaVersion::V1),
            _ => None,
        }
    }

    /// Reads the version from `DD_TRACE_SPAN_ATTRIBUTE_SCHEMA`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the version from an arbitrary key lookup, defaulting to v0.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup(ENV_SPAN_ATTRIBUTE_SCHEMA) else {
            return Self::default();
        };
        Self::parse(&raw).unwrap_or_else(|| {
            warn!(key = ENV_SPAN_ATTRIBUTE_SCHEMA, value = %raw, "unknown naming schema, using v0");
            Self::default()
        })
    }
}

impl NamingSchema for SchemaVersion {
    fn operation_name(&self, kind: OperationKind) -> String {
        let name = match (self, kind) {
            (SchemaVersion::V0, _) => "http.request",
            (SchemaVersion::V1, OperationKind::HttpServer) => "http.server.request",
            (SchemaVersion::V1, OperationKind::HttpClient) => "http.client.request",
        };
        name.to_string()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V0 => write!(f, "v0"),
            SchemaVersion::V1 => write!(f, "v1"),
        }
    }
}
