//! Error types for the request span core.
//!
//! Very little in this crate can fail. Per-request problems (a malformed
//! upstream trace header, an unresolvable client IP) are recovered locally and
//! only logged. The [`Error`] type surfaces in two places:
//!
//! - [`TraceConfig::from_env`](crate::TraceConfig::from_env): an invalid query
//!   obfuscation pattern is fatal at process start
//! - [`ClientIpResolver`](crate::ClientIpResolver): the resolver reports that
//!   no address could be determined, which the lifecycle manager swallows
//!
//! ```rust
//! use httptrace::{TraceConfig, ErrorKind};
//!
//! let err = TraceConfig::from_lookup(|key| match key {
//!     "DD_TRACE_OBFUSCATION_QUERY_STRING_REGEXP" => Some("(unclosed".to_string()),
//!     _ => None,
//! })
//! .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Configuration);
//! ```

mod core;
mod kind;

pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
