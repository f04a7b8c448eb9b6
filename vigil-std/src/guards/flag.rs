//! A switchable guard backed by an atomic flag.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use vigil_core::ContextGuard;

/// A guard whose validity is flipped from outside.
///
/// Clones share the same flag, so the owner of a session can keep one clone
/// and hand another to the context.
///
/// # Example
///
/// ```rust,ignore
/// let session = FlagGuard::new(true);
/// let ctx = Context::new("LoggedIn", session.clone());
/// // ... later, on logout:
/// session.set(false);
/// ```
#[derive(Debug, Clone)]
pub struct FlagGuard {
    flag: Arc<AtomicBool>,
}

impl FlagGuard {
    /// Create a guard with the given initial state.
    pub fn new(valid: bool) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(valid)),
        }
    }

    /// Set the state.
    pub fn set(&self, valid: bool) {
        self.flag.store(valid, Ordering::SeqCst);
    }

    /// Read the state without going through the async interface.
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl ContextGuard for FlagGuard {
    async fn is_valid(&self) -> bool {
        self.get()
    }
}
