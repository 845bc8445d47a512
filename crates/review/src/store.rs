//! Persistence seam for the review queue and feedback history.

use chrono::{DateTime, Utc};
use thiserror::Error;

use lojapet_core::{DecisionLogId, DecisionType, TenantId, UserId};
use lojapet_decision::Period;

use crate::feedback::FeedbackLog;
use crate::queue::{PendingReview, ReviewStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewStoreError {
    /// The store is unreachable or an internal lock was poisoned.
    #[error("review store unavailable: {0}")]
    Unavailable(String),

    #[error("no review queue entry for decision log {0}")]
    NotFound(DecisionLogId),
}

/// Review queue entries plus the append-only feedback history.
pub trait ReviewStore: Send + Sync {
    fn enqueue(&self, entry: PendingReview) -> Result<(), ReviewStoreError>;

    fn find_by_decision_log(
        &self,
        decision_log_id: DecisionLogId,
    ) -> Result<Option<PendingReview>, ReviewStoreError>;

    /// Stamp a terminal status on the queue entry. Last write wins when the
    /// entry is already resolved.
    fn resolve(
        &self,
        decision_log_id: DecisionLogId,
        status: ReviewStatus,
        resolved_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError>;

    fn list_pending(&self, tenant_id: TenantId) -> Result<Vec<PendingReview>, ReviewStoreError>;

    /// Append one feedback row. Never updates in place.
    fn append_feedback(&self, feedback: FeedbackLog) -> Result<(), ReviewStoreError>;

    fn feedback_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<FeedbackLog>, ReviewStoreError>;
}

impl<T> ReviewStore for std::sync::Arc<T>
where
    T: ReviewStore + ?Sized,
{
    fn enqueue(&self, entry: PendingReview) -> Result<(), ReviewStoreError> {
        (**self).enqueue(entry)
    }

    fn find_by_decision_log(
        &self,
        decision_log_id: DecisionLogId,
    ) -> Result<Option<PendingReview>, ReviewStoreError> {
        (**self).find_by_decision_log(decision_log_id)
    }

    fn resolve(
        &self,
        decision_log_id: DecisionLogId,
        status: ReviewStatus,
        resolved_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        (**self).resolve(decision_log_id, status, resolved_by, at)
    }

    fn list_pending(&self, tenant_id: TenantId) -> Result<Vec<PendingReview>, ReviewStoreError> {
        (**self).list_pending(tenant_id)
    }

    fn append_feedback(&self, feedback: FeedbackLog) -> Result<(), ReviewStoreError> {
        (**self).append_feedback(feedback)
    }

    fn feedback_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<FeedbackLog>, ReviewStoreError> {
        (**self).feedback_for_period(tenant_id, decision_type, period)
    }
}
