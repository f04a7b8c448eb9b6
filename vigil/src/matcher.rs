//! # Matcher
//!
//! The matcher owns two indexes keyed by event type name:
//!
//! - **templates**, keyed by the type of their first step, never mutated
//!   after [`MatcherBuilder::build`];
//! - **active instances**, keyed by the type of their next step. Instances
//!   live in an arena addressed by [`InstanceId`]; the index only stores ids,
//!   so re-keying an instance after it advances is a cheap remove/insert.
//!
//! # Per-event algorithm
//!
//! For an incoming event of type `T`:
//!
//! 1. **Active pass.** The bucket for `T` is detached from the index. Each
//!    instance in it, in insertion order, is checked: type, predicates,
//!    then active contexts. A match with valid contexts advances; the
//!    instance then either completes (sent to the completion sink and
//!    dropped) or is re-keyed under its next type. A match with an invalid
//!    context cancels the instance. Anything that does not match goes back
//!    into the bucket, ahead of entries re-keyed onto `T` during the pass,
//!    which are not revisited for this event.
//! 2. **Template pass.** Every template keyed under `T` is spawned into a
//!    fresh instance and put through the same checks. Only instances that
//!    advance are kept; a one-step template completes right away.
//!
//! A predicate or context check that panics or times out cancels only the
//! instance it belongs to; the fault goes to the error sink and processing
//! carries on with the next instance.

use crate::{
    index::TypeIndex,
    instance::{ContextPolicy, PatternInstance},
    step::Step,
    template::PatternTemplate,
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info};
use vigil_core::{
    Completed, CompletionSink, DynCompletionSink, DynErrorSink, ErrorSink, EvaluationError, Event,
    InstanceId, MatchFault, SharedEvent,
};
use vigil_std::sinks::{LoggingErrorSink, NoopSink};

/// Tunables for a [`Matcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherConfig {
    /// How a step's contexts combine with the active ones on advance.
    pub context_policy: ContextPolicy,
    /// Upper bound for each context check. `None`, the default, waits
    /// indefinitely: a stalled guard then stalls every later event.
    pub context_timeout: Option<Duration>,
}

/// What a single [`Matcher::process_event`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Active instances that advanced and are still waiting.
    pub advanced: usize,
    /// Instances spawned from templates, including ones that completed at once.
    pub spawned: usize,
    /// Instances that consumed their last step.
    pub completed: usize,
    /// Active instances dropped because a context was invalid.
    pub cancelled: usize,
    /// Instances dropped, or spawns suppressed, because a check failed.
    pub faulted: usize,
}

impl ProcessSummary {
    /// True if the event changed nothing.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Cumulative counters since the matcher was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherStats {
    /// Events processed.
    pub events: u64,
    /// See [`ProcessSummary::advanced`].
    pub advanced: u64,
    /// See [`ProcessSummary::spawned`].
    pub spawned: u64,
    /// See [`ProcessSummary::completed`].
    pub completed: u64,
    /// See [`ProcessSummary::cancelled`].
    pub cancelled: u64,
    /// See [`ProcessSummary::faulted`].
    pub faulted: u64,
}

impl MatcherStats {
    fn record(&mut self, summary: &ProcessSummary) {
        self.events += 1;
        self.advanced += summary.advanced as u64;
        self.spawned += summary.spawned as u64;
        self.completed += summary.completed as u64;
        self.cancelled += summary.cancelled as u64;
        self.faulted += summary.faulted as u64;
    }
}

enum Attempt {
    Skipped,
    Advanced,
    Cancelled,
    Faulted(EvaluationError),
}

/// The matching engine.
///
/// `process_event` takes `&mut self`: calls are serialized by ownership.
/// To feed one matcher from several producers, move it into a worker with
/// [`dispatch::spawn`](crate::dispatch::spawn).
pub struct Matcher<E: Event> {
    templates: TypeIndex<PatternTemplate<E>>,
    instances: HashMap<InstanceId, PatternInstance<E>>,
    active: TypeIndex<InstanceId>,
    next_id: u64,
    config: MatcherConfig,
    on_match: Box<dyn DynCompletionSink<E>>,
    on_error: Box<dyn DynErrorSink>,
    stats: MatcherStats,
}

impl<E: Event> Matcher<E> {
    /// Start building a matcher.
    pub fn builder() -> MatcherBuilder<E> {
        MatcherBuilder::new()
    }

    /// Feed one event through the active pass, then the template pass.
    pub async fn process_event(&mut self, event: E) -> ProcessSummary {
        let event = SharedEvent::new(event);
        let mut summary = ProcessSummary::default();

        self.process_active(&event, &mut summary).await;
        self.process_templates(&event, &mut summary).await;

        self.stats.record(&summary);
        summary
    }

    async fn process_active(&mut self, event: &SharedEvent<E>, summary: &mut ProcessSummary) {
        let Some((key, waiting)) = self.active.take(event.event_type()) else {
            return;
        };

        let mut retained = Vec::with_capacity(waiting.len());
        for id in waiting {
            let Some(mut instance) = self.instances.remove(&id) else {
                continue;
            };

            match self.attempt(&mut instance, event).await {
                Attempt::Skipped => {
                    self.instances.insert(id, instance);
                    retained.push(id);
                }
                Attempt::Advanced => {
                    if !instance.is_completed() {
                        summary.advanced += 1;
                    }
                    self.settle(id, instance, summary).await;
                }
                Attempt::Cancelled => {
                    summary.cancelled += 1;
                    debug!(
                        template = instance.template_name(),
                        instance = %id,
                        "context invalid, instance cancelled"
                    );
                }
                Attempt::Faulted(error) => {
                    summary.faulted += 1;
                    self.report(instance.template_key(), Some(id), error).await;
                }
            }
        }

        self.active.restore(key, retained);
    }

    async fn process_templates(&mut self, event: &SharedEvent<E>, summary: &mut ProcessSummary) {
        let candidates = self.templates.get(event.event_type()).len();

        for position in 0..candidates {
            let template = self.templates.get(event.event_type())[position].clone();
            let mut instance = template.spawn();

            match self.attempt(&mut instance, event).await {
                Attempt::Advanced => {
                    let id = self.allocate_id();
                    summary.spawned += 1;
                    debug!(template = template.name(), instance = %id, "instance spawned");
                    self.settle(id, instance, summary).await;
                }
                // A context failing on a fresh instance just means no spawn.
                Attempt::Skipped | Attempt::Cancelled => {}
                Attempt::Faulted(error) => {
                    summary.faulted += 1;
                    self.report(template.name_key(), None, error).await;
                }
            }
        }
    }

    async fn attempt(&self, instance: &mut PatternInstance<E>, event: &SharedEvent<E>) -> Attempt {
        match instance.try_matches(event) {
            Ok(true) => {}
            Ok(false) => return Attempt::Skipped,
            Err(error) => return Attempt::Faulted(error),
        }

        match instance.check_contexts(self.config.context_timeout).await {
            Ok(true) => {
                instance.advance_with(event.clone(), self.config.context_policy);
                Attempt::Advanced
            }
            Ok(false) => Attempt::Cancelled,
            Err(error) => Attempt::Faulted(error),
        }
    }

    /// Complete an advanced instance or re-key it under its next type.
    async fn settle(
        &mut self,
        id: InstanceId,
        instance: PatternInstance<E>,
        summary: &mut ProcessSummary,
    ) {
        match instance.next_expected_event().map(Step::event_type_key) {
            Some(next) => {
                debug!(
                    template = instance.template_name(),
                    instance = %id,
                    next = %next,
                    "instance advanced"
                );
                self.active.insert(next, id);
                self.instances.insert(id, instance);
            }
            None => {
                summary.completed += 1;
                info!(
                    template = instance.template_name(),
                    instance = %id,
                    events = instance.history().len(),
                    "pattern completed"
                );
                let completed = Completed {
                    template: instance.template_key(),
                    instance: id,
                    history: instance.into_history(),
                };
                self.on_match.on_match_dyn(completed).await;
            }
        }
    }

    async fn report(
        &self,
        template: Arc<str>,
        instance: Option<InstanceId>,
        error: EvaluationError,
    ) {
        debug!(template = %template, instance = ?instance, error = %error, "check failed");
        self.on_error
            .on_fault_dyn(MatchFault {
                template,
                instance,
                error,
            })
            .await;
    }

    fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of in-flight instances.
    pub fn active_len(&self) -> usize {
        self.instances.len()
    }

    /// In-flight instance count per awaited event type.
    ///
    /// A bucket that only ever grows points at a template whose later steps
    /// never arrive or whose contexts never become invalid.
    pub fn active_counts(&self) -> BTreeMap<String, usize> {
        self.active.counts()
    }

    /// Ids of the instances waiting for `event_type`, in insertion order.
    pub fn active_ids(&self, event_type: &str) -> &[InstanceId] {
        self.active.get(event_type)
    }

    /// Look up an in-flight instance.
    pub fn instance(&self, id: InstanceId) -> Option<&PatternInstance<E>> {
        self.instances.get(&id)
    }

    /// Number of configured templates.
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Templates whose first step waits for `event_type`.
    pub fn templates_for(&self, event_type: &str) -> &[PatternTemplate<E>] {
        self.templates.get(event_type)
    }

    /// Cumulative counters.
    pub fn stats(&self) -> MatcherStats {
        self.stats
    }

    /// The configuration in effect.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Drop every in-flight instance. Returns how many were dropped.
    pub fn clear_active(&mut self) -> usize {
        let dropped = self.instances.len();
        self.instances.clear();
        self.active.clear();
        dropped
    }
}

impl<E: Event> fmt::Debug for Matcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("templates", &self.templates.counts())
            .field("active", &self.active.counts())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Builder for [`Matcher`].
///
/// # Example
///
/// ```rust,ignore
/// let mut matcher = Matcher::builder()
///     .template(PatternTemplate::new("login-purchase", [
///         Step::new("Login").activate(session),
///         Step::new("Purchase"),
///     ])?)
///     .on_match(|m: Completed<TypedEvent>| async move { println!("{:?}", m.history) })
///     .context_timeout(Duration::from_millis(50))
///     .build();
/// ```
pub struct MatcherBuilder<E: Event> {
    templates: Vec<PatternTemplate<E>>,
    config: MatcherConfig,
    on_match: Option<Box<dyn DynCompletionSink<E>>>,
    on_error: Option<Box<dyn DynErrorSink>>,
}

impl<E: Event> MatcherBuilder<E> {
    /// Create a builder with no templates and default configuration.
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            config: MatcherConfig::default(),
            on_match: None,
            on_error: None,
        }
    }

    /// Add a template.
    pub fn template(mut self, template: PatternTemplate<E>) -> Self {
        self.templates.push(template);
        self
    }

    /// Add several templates, keeping their order.
    pub fn templates(mut self, templates: impl IntoIterator<Item = PatternTemplate<E>>) -> Self {
        self.templates.extend(templates);
        self
    }

    /// Where completed matches go. Defaults to discarding them.
    pub fn on_match(mut self, sink: impl CompletionSink<E>) -> Self {
        self.on_match = Some(Box::new(sink));
        self
    }

    /// Where evaluation faults go. Defaults to [`LoggingErrorSink`].
    pub fn on_error(mut self, sink: impl ErrorSink) -> Self {
        self.on_error = Some(Box::new(sink));
        self
    }

    /// Set the context activation policy.
    pub fn context_policy(mut self, policy: ContextPolicy) -> Self {
        self.config.context_policy = policy;
        self
    }

    /// Bound every context check by `timeout`.
    ///
    /// A check that overruns cancels its instance with
    /// [`EvaluationError::ContextTimeout`]. Closure contexts built with
    /// [`Context::from_fn`](vigil_core::Context::from_fn) are moved to tokio's
    /// blocking pool so that even a blocking closure is cut off.
    ///
    /// Without a bound the matcher runs on any executor. With one,
    /// [`Matcher::process_event`] must run inside a tokio runtime with the
    /// time driver enabled, or it panics.
    pub fn context_timeout(mut self, timeout: Duration) -> Self {
        self.config.context_timeout = Some(timeout);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the matcher.
    pub fn build(self) -> Matcher<E> {
        let mut templates = TypeIndex::new();
        for template in self.templates {
            templates.insert(template.first_step().event_type_key(), template);
        }

        Matcher {
            templates,
            instances: HashMap::new(),
            active: TypeIndex::new(),
            next_id: 0,
            config: self.config,
            on_match: self
                .on_match
                .unwrap_or_else(|| Box::new(NoopSink) as Box<dyn DynCompletionSink<E>>),
            on_error: self
                .on_error
                .unwrap_or_else(|| Box::new(LoggingErrorSink) as Box<dyn DynErrorSink>),
            stats: MatcherStats::default(),
        }
    }
}

impl<E: Event> Default for MatcherBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_std::{TypedEvent, testing::RecordingSink};

    fn template(name: &str, kinds: &[&str]) -> PatternTemplate<TypedEvent> {
        PatternTemplate::new(name, kinds.iter().map(|k| Step::new(*k))).unwrap()
    }

    #[tokio::test]
    async fn test_rekey_onto_same_type_is_not_reprocessed() {
        let sink = RecordingSink::new();
        let mut matcher = Matcher::builder()
            .template(template("aaa", &["A", "A", "A"]))
            .on_match(sink.clone())
            .build();

        let first = matcher.process_event(TypedEvent::bare("A")).await;
        assert_eq!(first.spawned, 1);
        assert_eq!(first.advanced, 0);
        assert_eq!(matcher.active_ids("A").len(), 1);

        let second = matcher.process_event(TypedEvent::bare("A")).await;
        assert_eq!(second.advanced, 1);
        assert_eq!(second.spawned, 1);
        assert_eq!(sink.count(), 0);

        let third = matcher.process_event(TypedEvent::bare("A")).await;
        assert_eq!(third.completed, 1);
        assert_eq!(sink.count(), 1);
        assert_eq!(matcher.active_counts().get("A"), Some(&2));
    }

    #[tokio::test]
    async fn test_bucket_order_is_insertion_order() {
        let sink = RecordingSink::new();
        let mut matcher = Matcher::builder()
            .template(template("first", &["A", "B"]))
            .template(template("second", &["C", "B"]))
            .on_match(sink.clone())
            .build();

        matcher.process_event(TypedEvent::bare("A")).await;
        matcher.process_event(TypedEvent::bare("C")).await;
        matcher.process_event(TypedEvent::bare("B")).await;

        let names: Vec<_> = sink
            .matches()
            .iter()
            .map(|m| m.template.to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unmatched_instances_stay_in_place() {
        let mut matcher = Matcher::<TypedEvent<i32>>::builder()
            .template(
                PatternTemplate::new(
                    "positive",
                    [
                        Step::new("A"),
                        Step::new("B").predicate(
                            |e: &TypedEvent<i32>, _: &[SharedEvent<TypedEvent<i32>>]| {
                                e.attributes > 0
                            },
                        ),
                    ],
                )
                .unwrap(),
            )
            .build();

        matcher.process_event(TypedEvent::new("A", 0)).await;
        matcher.process_event(TypedEvent::new("A", 0)).await;
        let ids = matcher.active_ids("B").to_vec();

        let summary = matcher.process_event(TypedEvent::new("B", -1)).await;
        assert!(summary.is_noop());
        assert_eq!(matcher.active_ids("B"), ids.as_slice());
    }

    #[test]
    fn test_unbounded_checks_need_no_runtime() {
        use vigil_core::Context;

        let sink = RecordingSink::new();
        let mut matcher = Matcher::builder()
            .template(
                PatternTemplate::new(
                    "gated",
                    [
                        Step::new("A").activate(Context::from_fn("Open", || true)),
                        Step::new("B"),
                    ],
                )
                .unwrap(),
            )
            .on_match(sink.clone())
            .build();
        assert_eq!(matcher.config().context_timeout, None);

        futures::executor::block_on(async {
            matcher.process_event(TypedEvent::bare("A")).await;
            matcher.process_event(TypedEvent::bare("B")).await;
        });
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_stats_accumulate() {
        let mut matcher = Matcher::builder()
            .template(template("ab", &["A", "B"]))
            .build();

        matcher.process_event(TypedEvent::bare("A")).await;
        matcher.process_event(TypedEvent::bare("B")).await;
        matcher.process_event(TypedEvent::bare("Z")).await;

        let stats = matcher.stats();
        assert_eq!(stats.events, 3);
        assert_eq!(stats.spawned, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(matcher.active_len(), 0);
    }

    #[tokio::test]
    async fn test_clear_active() {
        let mut matcher = Matcher::builder()
            .template(template("ab", &["A", "B"]))
            .build();

        matcher.process_event(TypedEvent::bare("A")).await;
        matcher.process_event(TypedEvent::bare("A")).await;
        assert_eq!(matcher.clear_active(), 2);
        assert_eq!(matcher.active_len(), 0);
        assert!(matcher.active_counts().is_empty());
        assert_eq!(matcher.template_count(), 1);
    }
}
