//! One stage of a pattern.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use vigil_core::{Context, EvaluationError, Event, Predicate, SharedEvent, panic_message};

/// One stage of a pattern: the event type it waits for, the predicates the
/// event must satisfy, and the contexts it activates once satisfied.
///
/// Steps are immutable after construction and shared by every instance
/// spawned from the same template.
///
/// # Example
///
/// ```rust,ignore
/// let step = Step::new("Purchase")
///     .predicate(|e: &Purchase, h: &[SharedEvent<Purchase>]| e.amount > 100)
///     .activate(Context::new("Window", DeadlineGuard::after(Duration::from_secs(300))));
/// ```
pub struct Step<E> {
    event_type: Arc<str>,
    predicates: Vec<Arc<dyn Predicate<E>>>,
    contexts: Vec<Context>,
}

impl<E: 'static> Step<E> {
    /// A step waiting for `event_type`, with no predicates or contexts.
    pub fn new(event_type: impl Into<Arc<str>>) -> Self {
        Self {
            event_type: event_type.into(),
            predicates: Vec::new(),
            contexts: Vec::new(),
        }
    }

    /// Append a predicate. Predicates run in the order they are added.
    pub fn predicate(mut self, predicate: impl Predicate<E>) -> Self {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Add a context to activate once this step is satisfied.
    ///
    /// Contexts form a set keyed by name; adding a second context with an
    /// existing name replaces the first.
    pub fn activate(mut self, context: Context) -> Self {
        match self.contexts.iter_mut().find(|c| c.name() == context.name()) {
            Some(slot) => *slot = context,
            None => self.contexts.push(context),
        }
        self
    }
}

impl<E> Step<E> {
    /// The event type this step waits for.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub(crate) fn event_type_key(&self) -> Arc<str> {
        self.event_type.clone()
    }

    /// Number of predicates attached to this step.
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Contexts activated when this step is consumed.
    pub fn contexts_to_activate(&self) -> &[Context] {
        &self.contexts
    }
}

impl<E: Event> Step<E> {
    /// Type check, then every predicate in declaration order, stopping at the
    /// first failure. A panicking predicate propagates.
    pub fn accepts(&self, event: &E, history: &[SharedEvent<E>]) -> bool {
        event.event_type() == self.event_type()
            && self.predicates.iter().all(|p| p.evaluate(event, history))
    }

    /// Like [`accepts`](Self::accepts), but a panicking predicate becomes an
    /// [`EvaluationError::PredicatePanic`].
    pub fn try_accepts(
        &self,
        event: &E,
        history: &[SharedEvent<E>],
    ) -> Result<bool, EvaluationError> {
        if event.event_type() != self.event_type() {
            return Ok(false);
        }

        for (index, predicate) in self.predicates.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| predicate.evaluate(event, history))) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(payload) => {
                    return Err(EvaluationError::PredicatePanic {
                        step: self.event_type.to_string(),
                        index,
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }
        Ok(true)
    }
}

impl<E> Clone for Step<E> {
    fn clone(&self) -> Self {
        Self {
            event_type: self.event_type.clone(),
            predicates: self.predicates.clone(),
            contexts: self.contexts.clone(),
        }
    }
}

impl<E> fmt::Debug for Step<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("event_type", &self.event_type)
            .field("predicates", &self.predicates.len())
            .field("contexts", &self.contexts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_std::TypedEvent;

    type Ev = TypedEvent<i32>;

    #[test]
    fn test_type_gate_ignores_predicates() {
        let step = Step::<Ev>::new("EventOne").predicate(|_: &Ev, _: &[SharedEvent<Ev>]| true);
        assert!(step.accepts(&TypedEvent::new("EventOne", 0), &[]));
        assert!(!step.accepts(&TypedEvent::new("EventTwo", 0), &[]));
    }

    #[test]
    fn test_predicates_short_circuit_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let step = Step::<Ev>::new("EventOne")
            .predicate(|e: &Ev, _: &[SharedEvent<Ev>]| e.attributes > 0)
            .predicate(move |_: &Ev, _: &[SharedEvent<Ev>]| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            });

        assert!(!step.accepts(&TypedEvent::new("EventOne", 0), &[]));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(step.accepts(&TypedEvent::new("EventOne", 1), &[]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_try_accepts_reports_panicking_predicate() {
        let step = Step::<Ev>::new("EventOne")
            .predicate(|_: &Ev, _: &[SharedEvent<Ev>]| true)
            .predicate(|_: &Ev, h: &[SharedEvent<Ev>]| h[0].attributes == 1);

        let err = step
            .try_accepts(&TypedEvent::new("EventOne", 1), &[])
            .unwrap_err();
        match err {
            EvaluationError::PredicatePanic { step, index, .. } => {
                assert_eq!(step, "EventOne");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_activate_dedupes_by_name() {
        let step = Step::<Ev>::new("EventOne")
            .activate(Context::from_fn("Session", || true))
            .activate(Context::from_fn("Window", || true))
            .activate(Context::from_fn("Session", || false));

        let names: Vec<_> = step.contexts_to_activate().iter().map(Context::name).collect();
        assert_eq!(names, vec!["Session", "Window"]);
    }
}
