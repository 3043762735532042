//! Process-wide configuration for HTTP server request spans.

use regex::Regex;
use tracing::{debug, warn};

use crate::config::StatusErrorPredicate;
use crate::error::{Error, Result};

/// Disables recording query strings in `http.url` when true.
pub const ENV_QUERY_STRING_DISABLED: &str = "DD_TRACE_URL_QUERY_STRING_DISABLED";
/// Overrides the query string obfuscation pattern; empty disables obfuscation.
pub const ENV_QUERY_STRING_REGEXP: &str = "DD_TRACE_OBFUSCATION_QUERY_STRING_REGEXP";
/// Enables client IP tags when true.
pub const ENV_CLIENT_IP_ENABLED: &str = "DD_TRACE_CLIENT_IP_ENABLED";
/// Status codes or ranges treated as errors, e.g. `500-599,404`.
pub const ENV_SERVER_ERROR_STATUSES: &str = "DD_TRACE_HTTP_SERVER_ERROR_STATUSES";

/// Default obfuscation pattern for credentials, tokens and keys in query strings.
pub const DEFAULT_QUERY_STRING_REGEXP: &str = r#"(?i)(?:p(?:ass)?w(?:or)?d|pass(?:_?phrase)?|secret|(?:api_?|private_?|public_?|access_?|secret_?)key(?:_?id)?|token|consumer_?(?:id|key|secret)|sign(?:ed|ature)?|auth(?:entication|orization)?)(?:(?:\s|%20)*(?:=|%3D)[^&]+|(?:"|%22)(?:\s|%20)*(?::|%3A)(?:\s|%20)*(?:"|%22)(?:%2[^2]|%[^2]|[^"%])+(?:"|%22))|bearer(?:\s|%20)+[a-z0-9._\-]+|token(?::|%3A)[a-z0-9]{13}|gh[opsu]_[0-9a-zA-Z]{36}|ey[I-L](?:[\w=-]|%3D)+\.ey[I-L](?:[\w=-]|%3D)+(?:\.(?:[\w.+/=-]|%3D|%2F|%2B)+)?|-{5}BEGIN(?:[a-z\s]|%20)+PRIVATE(?:\s|%20)KEY-{5}[^\-]+-{5}END(?:[a-z\s]|%20)+PRIVATE(?:\s|%20)KEY|ssh-rsa(?:\s|%20)*(?:[a-z0-9/.+]|%2F|%5C|%2B){100,}"#;

/// Compiles [`DEFAULT_QUERY_STRING_REGEXP`].
fn default_query_string_regexp() -> Option<Regex> {
    Regex::new(DEFAULT_QUERY_STRING_REGEXP).ok()
}

/// Configuration for HTTP server request spans.
///
/// Resolved once at startup and shared read-only (usually behind an `Arc`)
/// by every request.
///
/// ## Default Values
///
/// - `trace_client_ip`: false
/// - `query_string`: true
/// - `query_string_regexp`: [`DEFAULT_QUERY_STRING_REGEXP`]
/// - `is_status_error`: 500-599
///
/// ## Example
///
/// ```rust
/// use httptrace::{TraceConfig, StatusErrorPredicate};
///
/// let config = TraceConfig::new()
///     .with_trace_client_ip(true)
///     .with_query_string_pattern(r"token=\w+")?
///     .with_status_error_predicate(StatusErrorPredicate::from_ranges([500..=599, 429..=429]));
///
/// assert!(config.trace_client_ip());
/// assert!(config.is_status_error(429));
/// # Ok::<(), httptrace::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Whether to resolve and tag the client IP.
    trace_client_ip: bool,

    /// Whether to include the query string in `http.url`.
    query_string: bool,

    /// Pattern whose matches in the query string are redacted.
    query_string_regexp: Option<Regex>,

    /// Statuses that mark the span as an error.
    is_status_error: StatusErrorPredicate,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trace_client_ip: false,
            query_string: true,
            query_string_regexp: default_query_string_regexp(),
            is_status_error: StatusErrorPredicate::default(),
        }
    }
}

impl TraceConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the configuration from the process environment.
    ///
    /// Fails only when `DD_TRACE_OBFUSCATION_QUERY_STRING_REGEXP` is not a
    /// valid pattern.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration from an arbitrary key lookup.
    ///
    /// ```rust
    /// use httptrace::TraceConfig;
    ///
    /// let config = TraceConfig::from_lookup(|key| match key {
    ///     "DD_TRACE_URL_QUERY_STRING_DISABLED" => Some("true".to_string()),
    ///     "DD_TRACE_HTTP_SERVER_ERROR_STATUSES" => Some("0,500-599".to_string()),
    ///     _ => None,
    /// })?;
    ///
    /// assert!(!config.query_string());
    /// assert!(config.is_status_error(0));
    /// # Ok::<(), httptrace::Error>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.query_string = !bool_var(&lookup, ENV_QUERY_STRING_DISABLED, false);
        config.trace_client_ip = bool_var(&lookup, ENV_CLIENT_IP_ENABLED, false);

        if let Some(pattern) = lookup(ENV_QUERY_STRING_REGEXP) {
            config.query_string_regexp = if pattern.is_empty() {
                None
            } else {
                let regexp = Regex::new(&pattern).map_err(|err| {
                    Error::configuration(format!("invalid {}: {}", ENV_QUERY_STRING_REGEXP, err))
                        .with_source(err)
                })?;
                Some(regexp)
            };
        }

        if let Some(statuses) = lookup(ENV_SERVER_ERROR_STATUSES) {
            match StatusErrorPredicate::parse(&statuses) {
                Some(predicate) => config.is_status_error = predicate,
                None => warn!(
                    key = ENV_SERVER_ERROR_STATUSES,
                    value = %statuses,
                    "no valid status codes, keeping default"
                ),
            }
        }

        debug!(
            trace_client_ip = config.trace_client_ip,
            query_string = config.query_string,
            obfuscation = config.query_string_regexp.is_some(),
            "resolved http server span configuration"
        );

        Ok(config)
    }

    /// Sets whether client IP tags are collected.
    #[must_use]
    pub fn with_trace_client_ip(mut self, enabled: bool) -> Self {
        self.trace_client_ip = enabled;
        self
    }

    /// Sets whether query strings are recorded in `http.url`.
    #[must_use]
    pub fn with_query_string(mut self, enabled: bool) -> Self {
        self.query_string = enabled;
        self
    }

    /// Sets the query obfuscation pattern; `None` records queries verbatim.
    #[must_use]
    pub fn with_query_string_regexp(mut self, regexp: Option<Regex>) -> Self {
        self.query_string_regexp = regexp;
        self
    }

    /// Compiles and sets the query obfuscation pattern.
    pub fn with_query_string_pattern(self, pattern: &str) -> Result<Self> {
        let regexp = Regex::new(pattern)?;
        Ok(self.with_query_string_regexp(Some(regexp)))
    }

    /// Sets the status error predicate.
    #[must_use]
    pub fn with_status_error_predicate(mut self, predicate: StatusErrorPredicate) -> Self {
        self.is_status_error = predicate;
        self
    }

    /// Returns whether client IP tags are collected.
    pub fn trace_client_ip(&self) -> bool {
        self.trace_client_ip
    }

    /// Returns whether query strings are recorded.
    pub fn query_string(&self) -> bool {
        self.query_string
    }

    /// Returns the query obfuscation pattern.
    pub fn query_string_regexp(&self) -> Option<&Regex> {
        self.query_string_regexp.as_ref()
    }

    /// Returns the status error predicate.
    pub fn status_error_predicate(&self) -> &StatusErrorPredicate {
        &self.is_status_error
    }

    /// Returns `true` if the status is configured as an error.
    pub fn is_status_error(&self, status: u16) -> bool {
        self.is_status_error.is_error(status)
    }
}

/// Reads a boolean variable, falling back to `default` for unset or
/// unparsable values.
fn bool_var<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(key, value = %raw, "ignoring invalid boolean");
            default
        }
    }
}
