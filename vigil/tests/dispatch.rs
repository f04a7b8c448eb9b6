//! Multi-producer ingestion through the dispatcher worker.

use vigil::{
    DispatchError, Dispatcher, Matcher, MatcherHandle, PatternTemplate, Step, dispatch,
    testing::RecordingSink,
};

mod common;
use common::{Ev, ev, sequence};

async fn produce<D: Dispatcher<Ev>>(dispatcher: &D, events: Vec<Ev>) {
    for event in events {
        dispatcher.dispatch(event).await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_are_serialized() {
    const PRODUCERS: usize = 4;
    const ROUNDS: usize = 25;

    let sink = RecordingSink::new();
    let templates = (0..PRODUCERS).map(|p| {
        PatternTemplate::new(
            format!("producer-{p}"),
            [Step::new(format!("open-{p}")), Step::new(format!("close-{p}"))],
        )
        .unwrap()
    });
    let matcher = Matcher::builder()
        .templates(templates)
        .on_match(sink.clone())
        .build();

    let (handle, worker) = dispatch::spawn(matcher, 16);

    let mut tasks = Vec::new();
    for p in 0..PRODUCERS {
        let producer: MatcherHandle<Ev> = handle.clone();
        tasks.push(tokio::spawn(async move {
            let events = (0..ROUNDS)
                .flat_map(|round| {
                    let value = round as i32;
                    [ev(&format!("open-{p}"), value), ev(&format!("close-{p}"), value)]
                })
                .collect();
            produce(&producer, events).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    drop(handle);

    let matcher = worker.await.unwrap();
    assert_eq!(matcher.stats().events, (PRODUCERS * ROUNDS * 2) as u64);

    // Every open is followed by its own close, so each round completes once.
    assert_eq!(sink.count(), PRODUCERS * ROUNDS);

    // Per-producer order survives the shared queue.
    for m in sink.matches() {
        let producer = m.template.trim_start_matches("producer-");
        assert_eq!(m.history[0].event_type, format!("open-{producer}"));
        assert_eq!(m.history[1].event_type, format!("close-{producer}"));
        assert_eq!(m.history[0].attributes, m.history[1].attributes);
    }
}

#[tokio::test]
async fn test_try_send_reports_full_queue() {
    let matcher = Matcher::builder()
        .template(sequence("ab", &["A", "B"]))
        .build();
    let (handle, worker) = dispatch::spawn(matcher, 1);

    // The current-thread runtime does not poll the worker until we yield.
    handle.try_send(ev("A", 0)).unwrap();
    assert_eq!(handle.try_send(ev("A", 1)), Err(DispatchError::Full));

    drop(handle);
    let matcher = worker.await.unwrap();
    assert_eq!(matcher.stats().events, 1);
}
