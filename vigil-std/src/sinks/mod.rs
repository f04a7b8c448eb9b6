//! Standard completion and error sinks.

mod logging;
mod noop;

pub use logging::{LoggingErrorSink, LoggingSink};
pub use noop::NoopSink;
