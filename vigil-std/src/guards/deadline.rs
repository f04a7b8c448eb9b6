//! A guard that holds until a point in time.

use std::time::{Duration, Instant};
use vigil_core::ContextGuard;

/// Valid until a fixed deadline, invalid afterwards.
///
/// Models a time window opened by a step: "the next step must arrive within
/// five minutes of this one".
#[derive(Debug, Clone, Copy)]
pub struct DeadlineGuard {
    deadline: Instant,
}

impl DeadlineGuard {
    /// Valid until `deadline`.
    pub fn until(deadline: Instant) -> Self {
        Self { deadline }
    }

    /// Valid for `window` from now.
    pub fn after(window: Duration) -> Self {
        Self::until(Instant::now() + window)
    }

    /// The deadline.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl ContextGuard for DeadlineGuard {
    async fn is_valid(&self) -> bool {
        Instant::now() < self.deadline
    }
}
