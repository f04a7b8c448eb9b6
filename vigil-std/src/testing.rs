//! Testing utilities for Vigil.
//!
//! This module provides doubles that make matcher behavior observable in
//! tests.
//!
//! # Features
//!
//! - [`RecordingSink`]: A completion sink that records every match
//! - [`RecordingErrorSink`]: An error sink that records every fault
//! - [`CountingGuard`]: A guard with a fixed answer that counts its calls
//! - [`PanickingGuard`]: A guard that always panics

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use vigil_core::{CompletionSink, Completed, ContextGuard, ErrorSink, MatchFault, Message};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Recording Sink
// ============================================================================

/// A completion sink that records every match it receives.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// the other to the matcher.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingSink::new();
/// let mut matcher = Matcher::builder()
///     .template(template)
///     .on_match(recorder.clone())
///     .build();
///
/// matcher.process_event(event).await;
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingSink<E> {
    matches: Arc<Mutex<Vec<Completed<E>>>>,
}

impl<E> RecordingSink<E> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            matches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded matches.
    pub fn matches(&self) -> Vec<Completed<E>> {
        lock(&self.matches).clone()
    }

    /// Get the number of recorded matches.
    pub fn count(&self) -> usize {
        lock(&self.matches).len()
    }

    /// Clear all recorded matches.
    pub fn clear(&self) {
        lock(&self.matches).clear();
    }
}

impl<E: Clone> RecordingSink<E> {
    /// Histories of the recorded matches, unwrapped to owned events.
    pub fn histories(&self) -> Vec<Vec<E>> {
        lock(&self.matches)
            .iter()
            .map(|m| m.history.iter().map(|e| e.inner().clone()).collect())
            .collect()
    }
}

impl<E> Default for RecordingSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingSink<E> {
    fn clone(&self) -> Self {
        Self {
            matches: self.matches.clone(),
        }
    }
}

impl<E: Message> CompletionSink<E> for RecordingSink<E> {
    async fn on_match(&self, completed: Completed<E>) {
        lock(&self.matches).push(completed);
    }
}

// ============================================================================
// Recording Error Sink
// ============================================================================

/// An error sink that records every fault it receives.
#[derive(Clone, Default)]
pub struct RecordingErrorSink {
    faults: Arc<Mutex<Vec<MatchFault>>>,
}

impl RecordingErrorSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded faults.
    pub fn faults(&self) -> Vec<MatchFault> {
        lock(&self.faults).clone()
    }

    /// Get the number of recorded faults.
    pub fn count(&self) -> usize {
        lock(&self.faults).len()
    }
}

impl ErrorSink for RecordingErrorSink {
    async fn on_fault(&self, fault: MatchFault) {
        lock(&self.faults).push(fault);
    }
}

// ============================================================================
// Counting Guard
// ============================================================================

/// A guard that answers a switchable value and counts how often it is asked.
///
/// # Example
///
/// ```rust,ignore
/// let guard = CountingGuard::new(true);
/// let ctx = Context::new("Session", guard.clone());
/// // ... drive the matcher ...
/// assert_eq!(guard.calls(), 1);
/// ```
#[derive(Clone)]
pub struct CountingGuard {
    calls: Arc<AtomicUsize>,
    answer: Arc<AtomicBool>,
}

impl CountingGuard {
    /// Create a guard that answers `answer`.
    pub fn new(answer: bool) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            answer: Arc::new(AtomicBool::new(answer)),
        }
    }

    /// Change the answer for subsequent calls.
    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    /// Number of validity checks so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContextGuard for CountingGuard {
    async fn is_valid(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Panicking Guard
// ============================================================================

/// A guard that panics on every check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingGuard;

impl ContextGuard for PanickingGuard {
    async fn is_valid(&self) -> bool {
        panic!("guard failure")
    }
}
