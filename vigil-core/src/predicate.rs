//! # Step Predicates
//!
//! A predicate decides whether an incoming event may satisfy a step, given
//! everything the instance has already consumed. Predicates are boolean by
//! contract: one that is "not applicable" answers `false`.
//!
//! Predicates compose the same way listeners do in a pipeline: [`and`],
//! [`or`] and [`not`] wrap the receiver in a small adaptor struct, and all of
//! them evaluate left to right with short-circuiting.
//!
//! [`and`]: Predicate::and
//! [`or`]: Predicate::or
//! [`not`]: Predicate::not

use crate::shared::SharedEvent;

/// A boolean test over the incoming event and the instance history.
///
/// Implemented automatically for closures of the shape
/// `Fn(&E, &[SharedEvent<E>]) -> bool`.
///
/// # Example
///
/// ```rust,ignore
/// // Incoming value must equal the value of the first matched event.
/// let same_value = |e: &Reading, history: &[SharedEvent<Reading>]| {
///     history.first().is_some_and(|first| first.value == e.value)
/// };
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Predicate` over `{E}`",
    label = "missing `Predicate` implementation",
    note = "Predicates are `Fn(&E, &[SharedEvent<E>]) -> bool` or implement `evaluate`."
)]
pub trait Predicate<E>: Send + Sync + 'static {
    /// Returns true if `event` satisfies this predicate given `history`.
    fn evaluate(&self, event: &E, history: &[SharedEvent<E>]) -> bool;

    /// Both predicates must hold. `other` is skipped when `self` fails.
    fn and<P>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
        P: Predicate<E>,
    {
        And {
            first: self,
            second: other,
        }
    }

    /// Either predicate may hold. `other` is skipped when `self` holds.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Predicate<E>,
    {
        Or {
            first: self,
            second: other,
        }
    }

    /// Inverts this predicate.
    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not { inner: self }
    }
}

impl<E, F> Predicate<E> for F
where
    F: Fn(&E, &[SharedEvent<E>]) -> bool + Send + Sync + 'static,
{
    fn evaluate(&self, event: &E, history: &[SharedEvent<E>]) -> bool {
        (self)(event, history)
    }
}

/// Conjunction of two predicates.
pub struct And<A, B> {
    first: A,
    second: B,
}

impl<E, A, B> Predicate<E> for And<A, B>
where
    A: Predicate<E>,
    B: Predicate<E>,
{
    fn evaluate(&self, event: &E, history: &[SharedEvent<E>]) -> bool {
        self.first.evaluate(event, history) && self.second.evaluate(event, history)
    }
}

/// Disjunction of two predicates.
pub struct Or<A, B> {
    first: A,
    second: B,
}

impl<E, A, B> Predicate<E> for Or<A, B>
where
    A: Predicate<E>,
    B: Predicate<E>,
{
    fn evaluate(&self, event: &E, history: &[SharedEvent<E>]) -> bool {
        self.first.evaluate(event, history) || self.second.evaluate(event, history)
    }
}

/// Negation of a predicate.
pub struct Not<P> {
    inner: P,
}

impl<E, P: Predicate<E>> Predicate<E> for Not<P> {
    fn evaluate(&self, event: &E, history: &[SharedEvent<E>]) -> bool {
        !self.inner.evaluate(event, history)
    }
}
