//! Wires the whole decision loop together over in-memory adapters:
//! orchestrator → review → learning → trust, all sharing one store and bus.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use lojapet_core::{DecisionLogId, UserId};
use lojapet_decision::{
    DecisionContext, DecisionLogStore, DecisionLogStoreError, DecisionPolicy, DecisionResult,
    EngineRegistry, Orchestrator,
};
use lojapet_events::{DecisionAppliedEvent, DecisionEvent, EventBus, InMemoryEventBus};
use lojapet_learning::LearningService;
use lojapet_review::ReviewService;
use lojapet_trust::TrustService;

use crate::in_memory_store::InMemoryDecisionStore;

pub type SharedStore = Arc<InMemoryDecisionStore>;
pub type SharedBus = Arc<InMemoryEventBus<DecisionEvent>>;
type SharedReviewService = Arc<ReviewService<SharedStore, SharedStore, SharedBus>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    DecisionLog(#[from] DecisionLogStoreError),
}

/// The assembled decision loop.
///
/// Everything shares one [`InMemoryDecisionStore`] and one bus; production
/// deployments swap the store for a database-backed implementation of the
/// same seams and keep this wiring shape.
pub struct DecisionPipeline {
    store: SharedStore,
    bus: SharedBus,
    review: SharedReviewService,
    trust: TrustService<SharedStore, SharedStore, SharedBus>,
    orchestrator: Orchestrator<SharedStore, SharedStore, SharedReviewService>,
}

impl DecisionPipeline {
    pub fn new(registry: EngineRegistry, policy: DecisionPolicy) -> Self {
        let store: SharedStore = Arc::new(InMemoryDecisionStore::new());
        let bus: SharedBus = Arc::new(InMemoryEventBus::new());
        let review: SharedReviewService =
            Arc::new(ReviewService::new(store.clone(), store.clone(), bus.clone()));
        let trust = TrustService::new(store.clone(), store.clone(), bus.clone());
        let orchestrator = Orchestrator::new(
            registry,
            policy,
            store.clone(),
            store.clone(),
            review.clone(),
        );

        Self {
            store,
            bus,
            review,
            trust,
            orchestrator,
        }
    }

    pub fn decide(&self, context: &DecisionContext) -> DecisionResult {
        self.orchestrator.decide(context)
    }

    pub fn review(&self) -> &ReviewService<SharedStore, SharedStore, SharedBus> {
        &self.review
    }

    pub fn trust(&self) -> &TrustService<SharedStore, SharedStore, SharedBus> {
        &self.trust
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    /// Stamp a logged decision as applied and announce it on the bus.
    ///
    /// `applied_by` is `None` for policy-driven automatic application.
    pub fn record_application(
        &self,
        decision_log_id: DecisionLogId,
        applied_by: Option<UserId>,
        application_result: impl Into<String>,
    ) -> Result<(), PipelineError> {
        let log = self.store.get(decision_log_id)?;
        let now = Utc::now();
        self.store.mark_applied(decision_log_id, now)?;

        let event = DecisionAppliedEvent {
            decision_id: log.request_id,
            decision_log_id,
            tenant_id: log.tenant_id,
            applied_decision: log.decision,
            applied_by,
            applied_automatically: applied_by.is_none(),
            application_result: application_result.into(),
            occurred_at: now,
        };
        if let Err(err) = self.bus.publish(DecisionEvent::Applied(event)) {
            warn!(%decision_log_id, ?err, "applied event publish failed; stamp stands");
        }
        Ok(())
    }

    /// Spawn the background learning consumer for this pipeline's bus.
    pub fn spawn_learning(&self) -> LearningRunnerHandle {
        LearningRunner::default().spawn(self.bus.clone(), self.store.clone())
    }
}

/// Config for the background learning consumer.
#[derive(Debug, Clone)]
pub struct LearningRunner {
    /// How often the loop wakes up to check for shutdown.
    pub poll_interval: Duration,
}

impl Default for LearningRunner {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Handle for the running learning consumer (graceful shutdown).
#[derive(Debug)]
pub struct LearningRunnerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl LearningRunnerHandle {
    /// Stop the consumer. Already-received events are drained first so a
    /// verdict submitted just before shutdown still updates the patterns.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl LearningRunner {
    /// Subscribe to the bus and consume `decision.reviewed` events into
    /// pattern updates. Processing failures are logged and never stop the
    /// loop; the feedback log keeps the ground truth for reprocessing.
    pub fn spawn<B>(&self, bus: B, store: SharedStore) -> LearningRunnerHandle
    where
        B: EventBus<DecisionEvent> + 'static,
    {
        // Subscribe before returning so no event published after spawn() is
        // missed.
        let subscription = bus.subscribe();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let poll_interval = self.poll_interval;

        let join = thread::Builder::new()
            .name("learning-runner".to_string())
            .spawn(move || {
                let service = LearningService::new(store);
                let process = |event: DecisionEvent| {
                    if let DecisionEvent::Reviewed(reviewed) = event {
                        match service.process_review_event(&reviewed) {
                            Ok(outcome) => {
                                debug!(decision_log_id = %reviewed.decision_log_id, ?outcome, "review event consumed")
                            }
                            Err(err) => warn!(
                                decision_log_id = %reviewed.decision_log_id,
                                error = %err,
                                "review event could not be learned from"
                            ),
                        }
                    }
                };

                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        while let Ok(event) = subscription.try_recv() {
                            process(event);
                        }
                        break;
                    }
                    match subscription.recv_timeout(poll_interval) {
                        Ok(event) => process(event),
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                        Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("learning runner stopped");
            })
            .expect("failed to spawn learning runner thread");

        LearningRunnerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}
