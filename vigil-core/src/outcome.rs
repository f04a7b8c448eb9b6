//! Records handed to sinks when an instance finishes or fails.

use crate::{error::EvaluationError, message::Message, shared::SharedEvent};
use std::{fmt, sync::Arc};

/// Stable identifier of a live pattern instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pattern instance that consumed all of its steps.
#[derive(Debug)]
pub struct Completed<E> {
    /// Name of the template the instance was spawned from.
    pub template: Arc<str>,
    /// The instance that completed.
    pub instance: InstanceId,
    /// Every consumed event, in match order.
    pub history: Vec<SharedEvent<E>>,
}

impl<E> Clone for Completed<E> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            instance: self.instance,
            history: self.history.clone(),
        }
    }
}

impl<E: Message> Message for Completed<E> {}

/// A pattern instance cancelled because a check failed to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFault {
    /// Name of the template involved.
    pub template: Arc<str>,
    /// The cancelled instance. `None` when the failure happened while
    /// spawning from the template, so no instance ever existed.
    pub instance: Option<InstanceId>,
    /// What went wrong.
    pub error: EvaluationError,
}

impl Message for MatchFault {}

impl fmt::Display for MatchFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            Some(id) => write!(f, "{} {}: {}", self.template, id, self.error),
            None => write!(f, "{} (spawn): {}", self.template, self.error),
        }
    }
}
