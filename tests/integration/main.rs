//! Integration tests for the request span core.
//!
//! Every test drives [`httptrace::RequestSpans`] end to end against the
//! in-memory [`httptrace::testing::RecordingTracer`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With log output
//! RUST_LOG=httptrace=trace cargo test --test integration -- --nocapture
//! ```

mod common;
mod concurrency_tests;
mod config_tests;
mod request_span_tests;
