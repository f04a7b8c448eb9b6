//! Logging sinks for match observation.

use std::fmt::Debug;
use vigil_core::{CompletionSink, Completed, ErrorSink, MatchFault, Message};

/// A completion sink that logs every finished match.
///
/// Uses `tracing` when the `tracing` feature is enabled and does nothing
/// otherwise.
///
/// # Example
///
/// ```rust,ignore
/// let matcher = Matcher::builder()
///     .template(login_then_purchase)
///     .on_match(LoggingSink::named("fraud"))
///     .build();
/// ```
pub struct LoggingSink {
    name: &'static str,
}

impl LoggingSink {
    /// Create a new `LoggingSink` with a default name.
    pub fn new() -> Self {
        Self { name: "match" }
    }

    /// Create a new `LoggingSink` with a custom name.
    ///
    /// The name is used in log messages to identify the matcher.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> CompletionSink<E> for LoggingSink
where
    E: Message + Debug,
{
    async fn on_match(&self, completed: Completed<E>) {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                name = %self.name,
                template = %completed.template,
                instance = %completed.instance,
                history = ?completed.history,
                "pattern matched"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, completed);
        }
    }
}

/// An error sink that logs faults at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorSink;

impl ErrorSink for LoggingErrorSink {
    async fn on_fault(&self, fault: MatchFault) {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(
                template = %fault.template,
                instance = ?fault.instance,
                error = %fault.error,
                "pattern instance faulted"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = fault;
        }
    }
}
