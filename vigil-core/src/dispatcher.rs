//! Dispatcher core traits.

use crate::message::Message;
use std::future::Future;

/// Something that accepts events on behalf of a matcher.
///
/// Implementations must preserve submission order per producer.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch events of type `{E}`",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher<{E}>` to hand events to a matcher."
)]
pub trait Dispatcher<E: Message>: Send + Sync {
    /// The error type returned by dispatch operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Hand the event over for processing.
    fn dispatch(&self, event: E) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
