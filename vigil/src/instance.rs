//! # Pattern Instances
//!
//! A [`PatternInstance`] is one live attempt to match a template against the
//! event stream. It owns three pieces of mutable state:
//!
//! - a cursor into the template's steps (the remaining steps are the suffix
//!   after the cursor),
//! - the set of contexts activated by the last consumed step,
//! - the ordered history of consumed events.
//!
//! The steps themselves are shared with the template and never mutated, so
//! spawning is cheap and instances never observe each other.
//!
//! # Check Order
//!
//! Callers drive an instance with the same sequence the matcher uses:
//! [`matches`](PatternInstance::matches) (type, then predicates), then
//! [`contexts_valid`](PatternInstance::contexts_valid), then
//! [`advance`](PatternInstance::advance).

use crate::{step::Step, template::PatternTemplate};
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};
use vigil_core::{Context, EvaluationError, Event, SharedEvent, panic_message};

/// How a step's contexts combine with the ones already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextPolicy {
    /// The consumed step's contexts replace the active set.
    #[default]
    Replace,
    /// The consumed step's contexts are added to the active set. A context
    /// with an already active name takes over that slot.
    Accumulate,
}

/// A live, in-progress match.
pub struct PatternInstance<E> {
    template: Arc<str>,
    steps: Arc<[Step<E>]>,
    cursor: usize,
    active_contexts: Vec<Context>,
    history: Vec<SharedEvent<E>>,
}

impl<E> PatternInstance<E> {
    /// A fresh instance at the start of `template`, with empty history and
    /// no active contexts.
    pub fn spawn(template: &PatternTemplate<E>) -> Self {
        Self::spawn_with_history(template, Vec::new())
    }

    /// A fresh instance whose history is pre-seeded, so predicates on the
    /// first step can already refer to earlier events.
    pub fn spawn_with_history(
        template: &PatternTemplate<E>,
        history: Vec<SharedEvent<E>>,
    ) -> Self {
        Self {
            template: template.name_key(),
            steps: template.shared_steps(),
            cursor: 0,
            active_contexts: Vec::new(),
            history,
        }
    }

    /// Name of the template this instance was spawned from.
    pub fn template_name(&self) -> &str {
        &self.template
    }

    pub(crate) fn template_key(&self) -> Arc<str> {
        self.template.clone()
    }

    /// Steps not yet consumed, in order.
    pub fn remaining_steps(&self) -> &[Step<E>] {
        &self.steps[self.cursor..]
    }

    /// The step the next event has to satisfy, or `None` once completed.
    pub fn next_expected_event(&self) -> Option<&Step<E>> {
        self.remaining_steps().first()
    }

    /// True once every step has been consumed.
    pub fn is_completed(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Contexts activated by the last consumed step.
    pub fn active_contexts(&self) -> &[Context] {
        &self.active_contexts
    }

    /// Consumed events, oldest first.
    pub fn history(&self) -> &[SharedEvent<E>] {
        &self.history
    }

    /// Consume the instance, keeping only its history.
    pub fn into_history(self) -> Vec<SharedEvent<E>> {
        self.history
    }

    /// Consume the next step with `event`, replacing the active contexts.
    ///
    /// Call only after [`matches`](Self::matches) and
    /// [`contexts_valid`](Self::contexts_valid) both returned true. Does
    /// nothing on a completed instance.
    pub fn advance(&mut self, event: impl Into<SharedEvent<E>>) {
        self.advance_with(event, ContextPolicy::Replace);
    }

    /// Consume the next step with `event`, combining contexts per `policy`.
    pub fn advance_with(&mut self, event: impl Into<SharedEvent<E>>, policy: ContextPolicy) {
        let Some(step) = self.steps.get(self.cursor) else {
            return;
        };

        match policy {
            ContextPolicy::Replace => {
                self.active_contexts = step.contexts_to_activate().to_vec();
            }
            ContextPolicy::Accumulate => {
                for context in step.contexts_to_activate() {
                    match self
                        .active_contexts
                        .iter_mut()
                        .find(|c| c.name() == context.name())
                    {
                        Some(slot) => *slot = context.clone(),
                        None => self.active_contexts.push(context.clone()),
                    }
                }
            }
        }

        self.cursor += 1;
        self.history.push(event.into());
    }

    /// True iff every active context is currently valid. Vacuously true
    /// when none are active. Checks run in activation order and stop at the
    /// first invalid context.
    pub async fn contexts_valid(&self) -> bool {
        for context in &self.active_contexts {
            if !context.is_valid().await {
                return false;
            }
        }
        true
    }

    /// Like [`contexts_valid`](Self::contexts_valid), but panicking guards and
    /// guards exceeding `limit` become errors instead of unwinding or hanging.
    ///
    /// With a `limit`, closure contexts run on tokio's blocking pool, so this
    /// must be awaited inside a runtime with the time driver enabled.
    pub async fn check_contexts(&self, limit: Option<Duration>) -> Result<bool, EvaluationError> {
        for context in &self.active_contexts {
            let outcome = match limit {
                Some(limit) => {
                    let check = AssertUnwindSafe(bounded_check(context)).catch_unwind();
                    match tokio::time::timeout(limit, check).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            return Err(EvaluationError::ContextTimeout {
                                context: context.name().to_string(),
                                timeout: limit,
                            });
                        }
                    }
                }
                None => AssertUnwindSafe(context.is_valid()).catch_unwind().await,
            };

            match outcome {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(payload) => {
                    return Err(EvaluationError::ContextPanic {
                        context: context.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }
        Ok(true)
    }
}

/// Evaluate a context so that a timeout around it can fire. A closure that
/// blocks would otherwise finish before the timer is ever polled.
async fn bounded_check(context: &Context) -> bool {
    let Some(check) = context.blocking_check().cloned() else {
        return context.is_valid().await;
    };

    match tokio::task::spawn_blocking(move || (*check)()).await {
        Ok(valid) => valid,
        Err(error) => match error.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            // Runtime shutting down.
            Err(_) => false,
        },
    }
}

impl<E: Event> PatternInstance<E> {
    /// True iff `event` has the next step's type and passes every one of its
    /// predicates against this instance's history. Always false once
    /// completed.
    pub fn matches(&self, event: &E) -> bool {
        self.next_expected_event()
            .is_some_and(|step| step.accepts(event, &self.history))
    }

    /// Like [`matches`](Self::matches), but a panicking predicate becomes an
    /// [`EvaluationError::PredicatePanic`].
    pub fn try_matches(&self, event: &E) -> Result<bool, EvaluationError> {
        match self.next_expected_event() {
            Some(step) => step.try_accepts(event, &self.history),
            None => Ok(false),
        }
    }
}

impl<E> std::fmt::Debug for PatternInstance<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternInstance")
            .field("template", &self.template)
            .field("next", &self.next_expected_event().map(Step::event_type))
            .field("remaining", &self.remaining_steps().len())
            .field("active_contexts", &self.active_contexts)
            .field("history", &self.history.len())
            .finish()
    }
}
