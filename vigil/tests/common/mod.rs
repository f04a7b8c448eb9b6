#![allow(dead_code)]

use vigil::{PatternTemplate, SharedEvent, Step, TypedEvent};

// ============================================================================
// Test Event Types
// ============================================================================

pub type Ev = TypedEvent<i32>;

pub fn ev(kind: &str, value: i32) -> Ev {
    TypedEvent::new(kind, value)
}

pub fn kinds(history: &[Ev]) -> Vec<&str> {
    history.iter().map(|e| e.event_type.as_str()).collect()
}

// ============================================================================
// Predicates
// ============================================================================

pub fn always(_: &Ev, _: &[SharedEvent<Ev>]) -> bool {
    true
}

/// Incoming value equals the value of the first matched event.
pub fn first_value_matches(e: &Ev, history: &[SharedEvent<Ev>]) -> bool {
    history
        .first()
        .is_some_and(|first| first.attributes == e.attributes)
}

pub fn explode(_: &Ev, _: &[SharedEvent<Ev>]) -> bool {
    panic!("predicate failure")
}

// ============================================================================
// Templates
// ============================================================================

pub fn sequence(name: &str, kinds: &[&str]) -> PatternTemplate<Ev> {
    PatternTemplate::new(name, kinds.iter().map(|k| Step::new(*k)))
        .expect("test templates are never empty")
}
