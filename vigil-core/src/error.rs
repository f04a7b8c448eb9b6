//! Error types for Vigil.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TemplateError`] - Pattern templates rejected at load time
//! - [`EvaluationError`] - Predicate or context checks that failed to produce an answer
//! - [`DispatchError`] - Errors handing events to a running matcher

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a pattern template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template has no steps and could never match.
    #[error("template `{template}` has no steps")]
    Empty {
        /// Template name.
        template: String,
    },

    /// A step expects an event with an empty type name.
    #[error("template `{template}` step {step} expects an empty event type")]
    EmptyEventType {
        /// Template name.
        template: String,
        /// Zero-based step index.
        step: usize,
    },
}

/// A predicate or context check that did not produce a boolean.
///
/// These never halt ingestion: the affected instance is cancelled (or never
/// spawned) and the error is reported to the error sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// A step predicate panicked.
    #[error("predicate {index} of step `{step}` panicked: {message}")]
    PredicatePanic {
        /// Event type of the step being matched.
        step: String,
        /// Zero-based position of the predicate within the step.
        index: usize,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A context guard panicked.
    #[error("context `{context}` panicked: {message}")]
    ContextPanic {
        /// Context name.
        context: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A context guard did not answer in time.
    #[error("context `{context}` timed out after {timeout:?}")]
    ContextTimeout {
        /// Context name.
        context: String,
        /// The configured bound.
        timeout: Duration,
    },
}

/// Errors that can occur handing an event to a running matcher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The matcher worker has stopped.
    #[error("matcher has been shut down")]
    Shutdown,

    /// The matcher queue is at capacity.
    #[error("matcher queue is full")]
    Full,
}

/// Render a panic payload as text.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
