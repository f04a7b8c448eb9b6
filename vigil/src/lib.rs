//! # vigil - Multi-Step Temporal Pattern Matching
//!
//! `vigil` watches a live stream of events for occurrences of patterns
//! defined ahead of time. A pattern is an ordered list of [`Step`]s; each
//! step names the event type it waits for, predicates the event must
//! satisfy against everything matched so far, and [`Context`]s that must
//! stay valid until the next step arrives.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigil::prelude::*;
//!
//! let template = PatternTemplate::new("one-two-three", [
//!     Step::new("EventOne"),
//!     Step::new("EventTwo"),
//!     Step::new("EventThree"),
//! ])?;
//!
//! let recorder = RecordingSink::new();
//! let mut matcher = Matcher::builder()
//!     .template(template)
//!     .on_match(recorder.clone())
//!     .build();
//!
//! for kind in ["EventOne", "EventTwo", "EventThree"] {
//!     matcher.process_event(TypedEvent::bare(kind)).await;
//! }
//! assert_eq!(recorder.count(), 1);
//! ```
//!
//! ## Concurrency
//!
//! [`Matcher::process_event`] takes `&mut self`. When several producers
//! feed one matcher, move it into a worker with [`dispatch::spawn`] and
//! share the returned [`MatcherHandle`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod index;
pub mod instance;
pub mod matcher;
pub mod step;
pub mod template;

pub use dispatch::MatcherHandle;
pub use instance::{ContextPolicy, PatternInstance};
pub use matcher::{Matcher, MatcherBuilder, MatcherConfig, MatcherStats, ProcessSummary};
pub use step::Step;
pub use template::PatternTemplate;

pub use vigil_core::{
    And, BlockingCheck, Completed, CompletionSink, Context, ContextGuard, DispatchError,
    Dispatcher, DynCompletionSink, DynContextGuard, DynErrorSink, ErrorSink, EvaluationError,
    Event, InstanceId, MatchFault, Message, Not, Or, Predicate, SharedEvent, TemplateError,
};
pub use vigil_std::TypedEvent;

/// Standard context guards.
pub mod guards {
    pub use vigil_std::guards::{DeadlineGuard, FlagGuard};

    #[cfg(feature = "timeout")]
    pub use vigil_std::guards::TimeoutGuard;
}

/// Standard completion and error sinks.
pub mod sinks {
    pub use vigil_std::sinks::{LoggingErrorSink, LoggingSink, NoopSink};
}

/// Testing utilities.
pub mod testing {
    pub use vigil_std::testing::{
        CountingGuard, PanickingGuard, RecordingErrorSink, RecordingSink,
    };
}

/// Prelude module - common imports for Vigil.
///
/// # Usage
///
/// ```rust,ignore
/// use vigil::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Completed, CompletionSink, Context, ContextGuard, ContextPolicy, ErrorSink, Event,
        MatchFault, Matcher, MatcherHandle, Message, PatternInstance, PatternTemplate, Predicate,
        SharedEvent, Step, TypedEvent,
        guards::{DeadlineGuard, FlagGuard},
        sinks::{LoggingErrorSink, LoggingSink, NoopSink},
        testing::{RecordingErrorSink, RecordingSink},
    };
}
