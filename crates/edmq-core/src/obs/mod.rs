//! Observability: query events and sink abstractions.

pub mod sink;

// re-exports
pub use sink::{ElementClass, QueryEvent, QueryOption, QuerySink, TracingSink, with_sink};
