//! Sink that discards everything.

use vigil_core::{CompletionSink, Completed, ErrorSink, MatchFault, Message};

/// Discards completions and faults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<E: Message> CompletionSink<E> for NoopSink {
    async fn on_match(&self, _completed: Completed<E>) {}
}

impl ErrorSink for NoopSink {
    async fn on_fault(&self, _fault: MatchFault) {}
}
