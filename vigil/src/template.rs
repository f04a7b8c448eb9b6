//! Immutable pattern blueprints.

use crate::{instance::PatternInstance, step::Step};
use std::{fmt, sync::Arc};
use vigil_core::TemplateError;

/// An immutable pattern definition.
///
/// A template never matches anything itself. Whenever an event could start
/// a new match, the matcher calls [`spawn`](Self::spawn) to get a fresh
/// [`PatternInstance`] with its own cursor, contexts and history; the steps
/// are shared read-only between the template and all of its instances.
pub struct PatternTemplate<E> {
    name: Arc<str>,
    steps: Arc<[Step<E>]>,
}

impl<E> PatternTemplate<E> {
    /// Build a template from an ordered step sequence.
    ///
    /// Fails with [`TemplateError::Empty`] if `steps` is empty and with
    /// [`TemplateError::EmptyEventType`] if any step waits for `""`.
    pub fn new(
        name: impl Into<Arc<str>>,
        steps: impl IntoIterator<Item = Step<E>>,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let steps: Arc<[Step<E>]> = steps.into_iter().collect();

        if steps.is_empty() {
            return Err(TemplateError::Empty {
                template: name.to_string(),
            });
        }
        if let Some(step) = steps.iter().position(|s| s.event_type().is_empty()) {
            return Err(TemplateError::EmptyEventType {
                template: name.to_string(),
                step,
            });
        }

        Ok(Self { name, steps })
    }

    /// The template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_key(&self) -> Arc<str> {
        self.name.clone()
    }

    /// The full step sequence.
    pub fn steps(&self) -> &[Step<E>] {
        &self.steps
    }

    pub(crate) fn shared_steps(&self) -> Arc<[Step<E>]> {
        self.steps.clone()
    }

    /// The step a new match has to start with.
    pub fn first_step(&self) -> &Step<E> {
        // `new` guarantees at least one step.
        &self.steps[0]
    }

    /// Create a fresh instance at the start of this pattern.
    pub fn spawn(&self) -> PatternInstance<E> {
        PatternInstance::spawn(self)
    }
}

impl<E> Clone for PatternTemplate<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            steps: self.steps.clone(),
        }
    }
}

impl<E> fmt::Debug for PatternTemplate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternTemplate")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish()
    }
}
