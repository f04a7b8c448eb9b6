//! # vigil-std
//!
//! Standard implementations for the Vigil complex-event-processing matcher.
//!
//! This crate provides:
//! - **Events**: [`TypedEvent`], a type name plus an opaque attribute payload
//! - **Guards**: [`FlagGuard`](guards::FlagGuard), [`DeadlineGuard`](guards::DeadlineGuard),
//!   and `TimeoutGuard` (with the `timeout` feature)
//! - **Sinks**: Logging and no-op completion/error sinks
//! - **Testing**: recording sinks and counting guards

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use vigil_core;

// Modules
pub mod event;
pub mod guards;
pub mod sinks;
pub mod testing;

pub use event::TypedEvent;
