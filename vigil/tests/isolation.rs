//! Failing checks cancel only the instance they belong to.

use std::time::{Duration, Instant};
use vigil::{
    Context, ContextGuard, EvaluationError, Matcher, PatternTemplate, Step, TemplateError,
    testing::{PanickingGuard, RecordingErrorSink, RecordingSink},
};

mod common;
use common::{Ev, ev, explode, sequence};

struct Stalled;

impl ContextGuard for Stalled {
    async fn is_valid(&self) -> bool {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        true
    }
}

#[test]
fn test_empty_template_is_a_configuration_error() {
    let err = PatternTemplate::<Ev>::new("empty", Vec::new()).unwrap_err();
    assert!(matches!(err, TemplateError::Empty { .. }));
}

#[tokio::test]
async fn test_panicking_predicate_cancels_only_its_instance() {
    let sink = RecordingSink::new();
    let errors = RecordingErrorSink::new();
    let mut matcher = Matcher::builder()
        .template(
            PatternTemplate::new("fragile", [Step::new("A"), Step::new("B").predicate(explode)])
                .unwrap(),
        )
        .template(sequence("sturdy", &["A", "B"]))
        .on_match(sink.clone())
        .on_error(errors.clone())
        .build();

    matcher.process_event(ev("A", 0)).await;
    assert_eq!(matcher.active_ids("B").len(), 2);
    let fragile_id = matcher.active_ids("B")[0];

    let summary = matcher.process_event(ev("B", 0)).await;
    assert_eq!(summary.faulted, 1);
    assert_eq!(summary.completed, 1);

    assert_eq!(sink.count(), 1);
    assert_eq!(&*sink.matches()[0].template, "sturdy");

    let faults = errors.faults();
    assert_eq!(faults.len(), 1);
    assert_eq!(&*faults[0].template, "fragile");
    assert_eq!(faults[0].instance, Some(fragile_id));
    assert!(matches!(
        faults[0].error,
        EvaluationError::PredicatePanic { index: 0, .. }
    ));
    assert_eq!(matcher.active_len(), 0);
}

#[tokio::test]
async fn test_panicking_predicate_on_first_step_suppresses_spawn() {
    let errors = RecordingErrorSink::new();
    let mut matcher = Matcher::builder()
        .template(PatternTemplate::new("fragile", [Step::new("A").predicate(explode)]).unwrap())
        .template(sequence("sturdy", &["A", "B"]))
        .on_error(errors.clone())
        .build();

    let summary = matcher.process_event(ev("A", 0)).await;
    assert_eq!(summary.spawned, 1);
    assert_eq!(summary.faulted, 1);

    let faults = errors.faults();
    assert_eq!(faults[0].instance, None);
    assert_eq!(matcher.active_ids("B").len(), 1);
}

#[tokio::test]
async fn test_panicking_guard_is_reported() {
    let errors = RecordingErrorSink::new();
    let mut matcher = Matcher::builder()
        .template(
            PatternTemplate::new(
                "broken-guard",
                [
                    Step::new("A").activate(Context::new("Broken", PanickingGuard)),
                    Step::new("B"),
                ],
            )
            .unwrap(),
        )
        .on_error(errors.clone())
        .build();

    matcher.process_event(ev("A", 0)).await;
    let summary = matcher.process_event(ev("B", 0)).await;

    assert_eq!(summary.faulted, 1);
    assert_eq!(matcher.active_len(), 0);
    assert!(matches!(
        &errors.faults()[0].error,
        EvaluationError::ContextPanic { context, .. } if context == "Broken"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_context_times_out() {
    let sink = RecordingSink::new();
    let errors = RecordingErrorSink::new();
    let mut matcher = Matcher::builder()
        .template(
            PatternTemplate::new(
                "stalled",
                [
                    Step::new("A").activate(Context::new("Remote", Stalled)),
                    Step::new("B"),
                ],
            )
            .unwrap(),
        )
        .template(sequence("other", &["C", "D"]))
        .context_timeout(Duration::from_millis(20))
        .on_match(sink.clone())
        .on_error(errors.clone())
        .build();

    matcher.process_event(ev("A", 0)).await;
    let summary = matcher.process_event(ev("B", 0)).await;
    assert_eq!(summary.faulted, 1);
    assert_eq!(
        errors.faults()[0].error,
        EvaluationError::ContextTimeout {
            context: "Remote".into(),
            timeout: Duration::from_millis(20),
        }
    );

    // Unrelated patterns keep flowing.
    matcher.process_event(ev("C", 0)).await;
    matcher.process_event(ev("D", 0)).await;
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_blocking_closure_context_times_out() {
    let sink = RecordingSink::new();
    let errors = RecordingErrorSink::new();
    let blocking = Context::from_fn("Blocking", || {
        std::thread::sleep(Duration::from_millis(500));
        true
    });
    let mut matcher = Matcher::builder()
        .template(
            PatternTemplate::new("slow", [Step::new("A").activate(blocking), Step::new("B")])
                .unwrap(),
        )
        .context_timeout(Duration::from_millis(20))
        .on_match(sink.clone())
        .on_error(errors.clone())
        .build();

    matcher.process_event(ev("A", 0)).await;
    let started = Instant::now();
    let summary = matcher.process_event(ev("B", 0)).await;

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(summary.faulted, 1);
    assert_eq!(summary.completed, 0);
    assert_eq!(matcher.active_len(), 0);
    assert_eq!(sink.count(), 0);
    assert_eq!(
        errors.faults()[0].error,
        EvaluationError::ContextTimeout {
            context: "Blocking".into(),
            timeout: Duration::from_millis(20),
        }
    );
}

#[tokio::test]
async fn test_faults_show_up_in_stats() {
    let mut matcher = Matcher::builder()
        .template(PatternTemplate::new("fragile", [Step::new("A").predicate(explode)]).unwrap())
        .on_error(RecordingErrorSink::new())
        .build();

    for _ in 0..3 {
        matcher.process_event(ev("A", 0)).await;
    }
    assert_eq!(matcher.stats().faulted, 3);
    assert_eq!(matcher.stats().spawned, 0);
}
