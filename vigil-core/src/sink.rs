//! # Sinks
//!
//! The matcher has two outlets. Completed instances go to a
//! [`CompletionSink`]; instances cancelled because a check could not be
//! evaluated go to an [`ErrorSink`]. Both are injected when the matcher is
//! built and both are plain async callbacks.

use crate::{
    message::Message,
    outcome::{Completed, MatchFault},
};
use std::{future::Future, pin::Pin};

/// Receiver of completed matches.
///
/// Implemented for closures `Fn(Completed<E>) -> impl Future<Output = ()>`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot receive completed matches of `{E}`",
    label = "missing `CompletionSink<{E}>` implementation",
    note = "Sinks must implement `on_match`, or be an async closure over `Completed<{E}>`."
)]
pub trait CompletionSink<E: Message>: Send + Sync + 'static {
    /// Called once per completed instance, with its full history.
    fn on_match(&self, completed: Completed<E>) -> impl Future<Output = ()> + Send;
}

/// Object-safe version of [`CompletionSink`].
pub trait DynCompletionSink<E: Message>: Send + Sync + 'static {
    /// Dynamic dispatch version of [`CompletionSink::on_match`].
    fn on_match_dyn<'a>(
        &'a self,
        completed: Completed<E>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

impl<E: Message, T: CompletionSink<E>> DynCompletionSink<E> for T {
    fn on_match_dyn<'a>(
        &'a self,
        completed: Completed<E>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.on_match(completed))
    }
}

impl<E, F, Fut> CompletionSink<E> for F
where
    E: Message,
    F: Fn(Completed<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn on_match(&self, completed: Completed<E>) -> impl Future<Output = ()> + Send {
        (self)(completed)
    }
}

/// Receiver of evaluation faults.
pub trait ErrorSink: Send + Sync + 'static {
    /// Called once per cancelled instance or suppressed spawn.
    fn on_fault(&self, fault: MatchFault) -> impl Future<Output = ()> + Send;
}

/// Object-safe version of [`ErrorSink`].
pub trait DynErrorSink: Send + Sync + 'static {
    /// Dynamic dispatch version of [`ErrorSink::on_fault`].
    fn on_fault_dyn<'a>(
        &'a self,
        fault: MatchFault,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

impl<T: ErrorSink> DynErrorSink for T {
    fn on_fault_dyn<'a>(
        &'a self,
        fault: MatchFault,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.on_fault(fault))
    }
}

impl<F, Fut> ErrorSink for F
where
    F: Fn(MatchFault) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn on_fault(&self, fault: MatchFault) -> impl Future<Output = ()> + Send {
        (self)(fault)
    }
}
