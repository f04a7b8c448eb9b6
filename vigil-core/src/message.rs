//! Message and event traits.

/// A marker trait for payloads that travel through the matcher.
///
/// Messages must be `Send + Sync + 'static` so they can cross the dispatcher
/// queue and be shared between instance histories.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All events in Vigil must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}

/// A discrete, immutable occurrence the matcher can consume.
///
/// The matcher only ever looks at [`event_type`](Event::event_type); every
/// other attribute is opaque to it and only meaningful to predicates.
///
/// # Example
///
/// ```rust,ignore
/// struct Login { user: String }
///
/// impl Message for Login {}
/// impl Event for Login {
///     fn event_type(&self) -> &str { "Login" }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Vigil `Event`",
    label = "missing `Event` implementation",
    note = "Events must report their type name through `event_type`."
)]
pub trait Event: Message {
    /// The type name used to index pattern steps.
    fn event_type(&self) -> &str;
}

impl Event for &'static str {
    fn event_type(&self) -> &str {
        self
    }
}

impl Event for String {
    fn event_type(&self) -> &str {
        self
    }
}

impl<T: Event> Event for Box<T> {
    fn event_type(&self) -> &str {
        (**self).event_type()
    }
}
