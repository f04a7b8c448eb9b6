//! Serialized, multi-producer front end for a [`Matcher`].
//!
//! [`spawn`] moves a matcher into a tokio task that drains a bounded queue.
//! Every producer holds a [`MatcherHandle`] onto the same queue, so events
//! are processed strictly one at a time in arrival order, and a slow
//! producer never sees a half-updated index.
//!
//! # Example
//!
//! ```rust,ignore
//! let (handle, worker) = vigil::dispatch::spawn(matcher, 1024);
//!
//! let producer = handle.clone();
//! tokio::spawn(async move { producer.send(TypedEvent::bare("Login")).await });
//!
//! drop(handle); // once every handle is gone the worker drains and stops
//! let matcher = worker.await?;
//! ```

use crate::matcher::Matcher;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::{Instrument, info_span};
use vigil_core::{DispatchError, Dispatcher, Event};

/// A cloneable producer handle onto a running matcher.
pub struct MatcherHandle<E> {
    tx: mpsc::Sender<E>,
}

impl<E: Event> MatcherHandle<E> {
    /// Queue an event, waiting for room if the queue is full.
    pub async fn send(&self, event: E) -> Result<(), DispatchError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| DispatchError::Shutdown)
    }

    /// Queue an event without waiting.
    pub fn try_send(&self, event: E) -> Result<(), DispatchError> {
        self.tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => DispatchError::Full,
            TrySendError::Closed(_) => DispatchError::Shutdown,
        })
    }

    /// True once the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<E> Clone for MatcherHandle<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Event> Dispatcher<E> for MatcherHandle<E> {
    type Error = DispatchError;

    async fn dispatch(&self, event: E) -> Result<(), Self::Error> {
        self.send(event).await
    }
}

/// Move `matcher` into a worker task fed by a queue of `capacity` events.
///
/// Returns a producer handle and the worker's join handle. The worker ends
/// once every handle has been dropped and the queue is drained, yielding the
/// matcher back for inspection. A `capacity` of zero is raised to one.
///
/// Must be called from within a tokio runtime.
pub fn spawn<E: Event>(
    mut matcher: Matcher<E>,
    capacity: usize,
) -> (MatcherHandle<E>, JoinHandle<Matcher<E>>) {
    let (tx, mut rx) = mpsc::channel(capacity.max(1));

    let worker = tokio::spawn(
        async move {
            while let Some(event) = rx.recv().await {
                matcher.process_event(event).await;
            }
            tracing::debug!(stats = ?matcher.stats(), "matcher queue closed");
            matcher
        }
        .instrument(info_span!("vigil_matcher")),
    );

    (MatcherHandle { tx }, worker)
}
