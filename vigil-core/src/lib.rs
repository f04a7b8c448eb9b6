//! # vigil-core
//!
//! Core traits for the Vigil complex-event-processing matcher.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that supplies events, predicates, guards or sinks without pulling in the
//! matching engine itself.
//!
//! # Pieces
//!
//! - [`Event`]: anything with a type name. Attributes are opaque.
//! - [`Predicate`]: boolean test over the incoming event and the history
//!   consumed so far.
//! - [`Context`]: a named [`ContextGuard`] over external state, activated by
//!   steps and checked before every advance.
//! - [`CompletionSink`] / [`ErrorSink`]: where finished and failed instances go.
//! - [`Dispatcher`]: the hand-off point between producers and a running matcher.
//!
//! # Error Types
//!
//! - [`TemplateError`] - Malformed templates
//! - [`EvaluationError`] - Panicking or timed-out checks
//! - [`DispatchError`] - Matcher no longer running

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod dispatcher;
mod error;
mod message;
mod outcome;
mod predicate;
mod shared;
mod sink;

// Re-exports
pub use context::{BlockingCheck, Context, ContextGuard, DynContextGuard};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, EvaluationError, TemplateError, panic_message};
pub use message::{Event, Message};
pub use outcome::{Completed, InstanceId, MatchFault};
pub use predicate::{And, Not, Or, Predicate};
pub use shared::SharedEvent;
pub use sink::{CompletionSink, DynCompletionSink, DynErrorSink, ErrorSink};
