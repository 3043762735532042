//! Span-side types shared with the tracer implementation.
//!
//! The request span core never owns spans itself. It assembles an ordered list
//! of [`SpanOption`]s, folds them into an immutable [`StartSpanConfig`] and
//! hands that to a [`Tracer`]. On finish it sets tags through the [`Span`]
//! trait and passes a [`FinishConfig`] along.
//!
//! ```text
//! SpanOption, SpanOption, ...  ──fold──▶  StartSpanConfig  ──▶  Tracer::start_span
//!                                                                   │
//!                                        Span::set_tag, Span::finish ◀┘
//! ```

mod context;
pub mod ext;
mod options;
mod tracer;
mod value;

pub use context::{ExtractError, ExtractedContext, SpanContext, SpanId, SpanLink, TraceFlags, TraceId};
pub use options::{FinishConfig, FinishOption, SpanOption, StartSpanConfig};
pub use tracer::{Span, Tracer};
pub use value::{SpanTagSet, TagValue};
