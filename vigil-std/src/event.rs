//! The default event shape: a type name plus opaque attributes.

use std::fmt;
use vigil_core::{Event, Message};

/// An event made of a type name and an attribute payload.
///
/// The payload is whatever the ingestion layer produces; the matcher never
/// looks inside it, only predicates do.
///
/// # Example
///
/// ```rust,ignore
/// let reading = TypedEvent::new("Temperature", 21.5_f64);
/// assert_eq!(reading.event_type(), "Temperature");
/// assert_eq!(reading.attributes, 21.5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedEvent<A = ()> {
    /// Type name used for step matching.
    pub event_type: String,
    /// Opaque payload.
    pub attributes: A,
}

impl<A> TypedEvent<A> {
    /// Create an event with the given type and attributes.
    pub fn new(event_type: impl Into<String>, attributes: A) -> Self {
        Self {
            event_type: event_type.into(),
            attributes,
        }
    }
}

impl TypedEvent<()> {
    /// Create an event that carries only a type name.
    pub fn bare(event_type: impl Into<String>) -> Self {
        Self::new(event_type, ())
    }
}

impl<A: Send + Sync + 'static> Message for TypedEvent<A> {}

impl<A: Send + Sync + 'static> Event for TypedEvent<A> {
    fn event_type(&self) -> &str {
        &self.event_type
    }
}

impl<A: fmt::Debug> fmt::Display for TypedEvent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{:?}}}", self.event_type, self.attributes)
    }
}
