//! Human review workflow: queue intake and verdict submission.

use chrono::Utc;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lojapet_core::{DecisionLogId, TenantId, UserId};
use lojapet_decision::{DecisionLogStore, DecisionLogStoreError, ReviewQueue, ReviewQueueError, ReviewRequest};
use lojapet_events::{DecisionEvent, DecisionReviewedEvent, EventBus, ReviewAction};

use crate::feedback::FeedbackLog;
use crate::queue::{PendingReview, ReviewStatus};
use crate::store::{ReviewStore, ReviewStoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error(transparent)]
    Store(#[from] ReviewStoreError),

    #[error(transparent)]
    DecisionLog(#[from] DecisionLogStoreError),

    /// A `Corrected` verdict must say what the right answer was.
    #[error("corrected verdict submitted without corrected data")]
    MissingCorrectedData,
}

/// Takes review-required decisions in from the orchestrator and turns human
/// verdicts into feedback rows and `decision.reviewed` events.
///
/// The feedback log is the source of truth; the published event is a
/// notification and may be re-emitted, so a publish failure never fails the
/// submission.
pub struct ReviewService<S, L, B> {
    store: S,
    log_store: L,
    bus: B,
}

impl<S, L, B> ReviewService<S, L, B>
where
    S: ReviewStore,
    L: DecisionLogStore,
    B: EventBus<DecisionEvent>,
{
    pub fn new(store: S, log_store: L, bus: B) -> Self {
        Self {
            store,
            log_store,
            bus,
        }
    }

    pub fn pending(&self, tenant_id: TenantId) -> Result<Vec<PendingReview>, ReviewError> {
        Ok(self.store.list_pending(tenant_id)?)
    }

    /// Record a human verdict on a logged decision.
    ///
    /// Safe to call more than once for the same decision: the queue entry
    /// keeps the latest verdict and every submission appends its own feedback
    /// row. Decisions that never went through the queue (auto-applied ones
    /// reviewed after the fact) are accepted too.
    pub fn submit_review(
        &self,
        decision_log_id: DecisionLogId,
        reviewer_id: UserId,
        action: ReviewAction,
        corrected_data: Option<JsonValue>,
        comment: Option<String>,
    ) -> Result<DecisionReviewedEvent, ReviewError> {
        if action == ReviewAction::Corrected && corrected_data.is_none() {
            return Err(ReviewError::MissingCorrectedData);
        }

        let log = self.log_store.get(decision_log_id)?;
        let now = Utc::now();

        match self
            .store
            .resolve(decision_log_id, ReviewStatus::from(action), reviewer_id, now)
        {
            Ok(()) => {}
            Err(ReviewStoreError::NotFound(_)) => {
                debug!(%decision_log_id, "verdict on a decision that was never queued");
            }
            Err(err) => return Err(err.into()),
        }

        self.store.append_feedback(FeedbackLog {
            id: Uuid::now_v7(),
            tenant_id: log.tenant_id,
            decision_log_id,
            decision_type: log.decision_type,
            reviewer_id,
            action,
            original_decision: log.decision.clone(),
            confidence_score_original: log.confidence_score,
            corrected_data: corrected_data.clone(),
            comment: comment.clone(),
            created_at: now,
        })?;

        self.log_store.mark_reviewed(decision_log_id, now)?;

        let event = DecisionReviewedEvent {
            event_id: Uuid::now_v7(),
            decision_id: log.request_id,
            decision_log_id,
            decision_type: log.decision_type,
            tenant_id: log.tenant_id,
            reviewer_id,
            action,
            original_decision: log.decision,
            confidence_score_original: log.confidence_score,
            input_signature: log.input_signature,
            corrected_data,
            comment,
            occurred_at: now,
        };

        if let Err(err) = self.bus.publish(DecisionEvent::Reviewed(event.clone())) {
            warn!(%decision_log_id, ?err, "reviewed event publish failed; feedback row stands");
        }

        info!(
            tenant_id = %event.tenant_id,
            %decision_log_id,
            action = action.as_str(),
            "review verdict recorded"
        );
        Ok(event)
    }
}

impl<S, L, B> ReviewQueue for ReviewService<S, L, B>
where
    S: ReviewStore,
    L: DecisionLogStore,
    B: EventBus<DecisionEvent>,
{
    fn enqueue(&self, request: ReviewRequest) -> Result<(), ReviewQueueError> {
        self.store
            .enqueue(PendingReview::from_request(request))
            .map_err(|err| ReviewQueueError::Unavailable(err.to_string()))
    }
}
