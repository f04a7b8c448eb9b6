//! Standard context guards.

mod deadline;
mod flag;
#[cfg(feature = "timeout")]
mod timeout;

pub use deadline::DeadlineGuard;
pub use flag::FlagGuard;
#[cfg(feature = "timeout")]
pub use timeout::TimeoutGuard;
