//! Configuration for HTTP server request spans.
//!
//! - [`TraceConfig`]: query string recording and obfuscation, client IP
//!   collection, error statuses
//! - [`StatusErrorPredicate`]: which statuses mark a span as an error

mod status_errors;
mod trace;

pub use status_errors::StatusErrorPredicate;
pub use trace::{
    DEFAULT_QUERY_STRING_REGEXP, ENV_CLIENT_IP_ENABLED, ENV_QUERY_STRING_DISABLED,
    ENV_QUERY_STRING_REGEXP, ENV_SERVER_ERROR_STATUSES, TraceConfig,
};
