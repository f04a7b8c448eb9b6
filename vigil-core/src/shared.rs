//! # Shared Event Wrapper
//!
//! Provides `SharedEvent<E>` for O(1) cloning via `Arc`.
//!
//! The matcher wraps each incoming event exactly once. Every instance that
//! consumes it stores a clone of the wrapper in its history, so one event fed
//! to a hundred instances is still a single allocation.

use crate::message::{Event, Message};
use std::ops::Deref;
use std::sync::Arc;

/// A shared, reference-counted event wrapper.
///
/// # Example
///
/// ```rust,ignore
/// use vigil_core::SharedEvent;
///
/// let event = SharedEvent::new(MyEvent { value: 1 });
/// let cloned = event.clone(); // only bumps the reference count
/// assert_eq!(event.value, cloned.value);
/// ```
#[derive(Debug)]
pub struct SharedEvent<E>(Arc<E>);

impl<E> SharedEvent<E> {
    /// Create a new shared event.
    pub fn new(event: E) -> Self {
        Self(Arc::new(event))
    }

    /// Get a reference to the inner event.
    pub fn inner(&self) -> &E {
        &self.0
    }

    /// Returns the number of strong references to this event.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns true if both wrappers point at the same event.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Clone for SharedEvent<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Deref for SharedEvent<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> AsRef<E> for SharedEvent<E> {
    fn as_ref(&self) -> &E {
        &self.0
    }
}

impl<E: PartialEq> PartialEq for SharedEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<E: Eq> Eq for SharedEvent<E> {}

impl<E> From<E> for SharedEvent<E> {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl<E: Message> Message for SharedEvent<E> {}

impl<E: Event> Event for SharedEvent<E> {
    fn event_type(&self) -> &str {
        self.0.event_type()
    }
}
