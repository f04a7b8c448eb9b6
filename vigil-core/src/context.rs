//! # Guard Contexts
//!
//! A context is a named guard over externally tracked state: a session flag,
//! a time window, a feature switch. Steps activate contexts once they are
//! satisfied; the instance then refuses to advance while any active context
//! reports itself invalid.
//!
//! Validity checks take no event argument and are asynchronous, since the
//! state behind them usually lives elsewhere (a clock, a session store).
//! The matcher treats them as opaque and may call them repeatedly.

use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// The capability behind a [`Context`].
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn` for zero-cost static dispatch.
/// [`Context`] stores guards through [`DynContextGuard`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `ContextGuard`",
    label = "missing `ContextGuard` implementation",
    note = "Guards must implement `is_valid`. Wrap plain closures with `Context::from_fn`."
)]
pub trait ContextGuard: Send + Sync + 'static {
    /// Returns true while the guarded condition holds.
    fn is_valid(&self) -> impl Future<Output = bool> + Send;
}

/// Object-safe version of [`ContextGuard`].
pub trait DynContextGuard: Send + Sync + 'static {
    /// Dynamic dispatch version of [`ContextGuard::is_valid`].
    fn is_valid_dyn<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

impl<T: ContextGuard> DynContextGuard for T {
    fn is_valid_dyn<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(self.is_valid())
    }
}

/// A synchronous validity check.
///
/// These may block, so a matcher that bounds context latency runs them on a
/// blocking thread rather than inline.
pub type BlockingCheck = Arc<dyn Fn() -> bool + Send + Sync + 'static>;

#[derive(Clone)]
enum Check {
    Guard(Arc<dyn DynContextGuard>),
    Blocking(BlockingCheck),
}

/// A named guard that a step can activate.
///
/// Cloning is cheap: the name and guard are reference counted, so many
/// instances can hold the same context at once.
#[derive(Clone)]
pub struct Context {
    name: Arc<str>,
    check: Check,
}

impl Context {
    /// Create a context backed by any guard.
    pub fn new(name: impl Into<Arc<str>>, guard: impl ContextGuard) -> Self {
        Self {
            name: name.into(),
            check: Check::Guard(Arc::new(guard)),
        }
    }

    /// Create a context from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<Arc<str>>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Check::Blocking(Arc::new(check)),
        }
    }

    /// The context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The closure behind a context built with [`from_fn`](Self::from_fn).
    pub fn blocking_check(&self) -> Option<&BlockingCheck> {
        match &self.check {
            Check::Blocking(check) => Some(check),
            Check::Guard(_) => None,
        }
    }

    /// Ask the guard whether the context currently holds.
    ///
    /// Closure contexts run inline on the polling task.
    pub fn is_valid(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        match &self.check {
            Check::Guard(guard) => guard.is_valid_dyn(),
            Check::Blocking(check) => Box::pin(async move { (**check)() }),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_context_name() {
        let ctx = Context::from_fn("Session", || true);
        assert_eq!(ctx.name(), "Session");
        assert_eq!(format!("{ctx:?}"), "Context { name: \"Session\" }");
    }

    #[tokio::test]
    async fn test_closure_guard() {
        let open = Arc::new(AtomicBool::new(true));
        let flag = open.clone();
        let ctx = Context::from_fn("Window", move || flag.load(Ordering::SeqCst));

        assert!(ctx.is_valid().await);
        open.store(false, Ordering::SeqCst);
        assert!(!ctx.is_valid().await);
    }

    #[tokio::test]
    async fn test_clones_share_guard() {
        struct Never;
        impl ContextGuard for Never {
            async fn is_valid(&self) -> bool {
                false
            }
        }

        let ctx = Context::new("Never", Never);
        let cloned = ctx.clone();
        assert!(!ctx.is_valid().await);
        assert!(!cloned.is_valid().await);
        assert!(ctx.blocking_check().is_none());
    }

    #[test]
    fn test_closure_context_exposes_blocking_check() {
        let ctx = Context::from_fn("Session", || true);
        let check = ctx.blocking_check().cloned().unwrap();
        assert!((*check)());
    }
}
