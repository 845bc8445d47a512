//! Append-only decision audit log and its persistence seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use lojapet_core::{DecisionId, DecisionLogId, DecisionType, TenantId};

use crate::policy::PolicyAction;

/// Half-open time window `[from, to)` for historical queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Period {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Trailing window ending now.
    pub fn last_days(days: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - chrono::Duration::days(days),
            to,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

/// Immutable audit record of one orchestrator run.
///
/// Never mutated after creation except to stamp the review and application
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLog {
    pub id: DecisionLogId,
    pub tenant_id: TenantId,
    pub request_id: DecisionId,
    pub decision_type: DecisionType,
    /// Snapshot of the request input (serialized context).
    pub input: JsonValue,
    /// Serialized decision payload.
    pub decision: JsonValue,
    pub input_signature: String,
    pub engine_used: String,
    pub confidence_score: u8,
    pub policy_action: PolicyAction,
    pub requires_review: bool,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionLogStoreError {
    /// The store is unreachable or an internal lock was poisoned.
    #[error("decision log store unavailable: {0}")]
    Unavailable(String),

    #[error("decision log {0} not found")]
    NotFound(DecisionLogId),
}

/// Persistence seam for decision logs. Append-only: implementations must
/// reject any mutation other than the review/application stamps.
pub trait DecisionLogStore: Send + Sync {
    fn save(&self, log: DecisionLog) -> Result<DecisionLogId, DecisionLogStoreError>;

    fn get(&self, id: DecisionLogId) -> Result<DecisionLog, DecisionLogStoreError>;

    fn mark_reviewed(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError>;

    fn mark_applied(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError>;

    fn load_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<DecisionLog>, DecisionLogStoreError>;
}

impl<T> DecisionLogStore for std::sync::Arc<T>
where
    T: DecisionLogStore + ?Sized,
{
    fn save(&self, log: DecisionLog) -> Result<DecisionLogId, DecisionLogStoreError> {
        (**self).save(log)
    }

    fn get(&self, id: DecisionLogId) -> Result<DecisionLog, DecisionLogStoreError> {
        (**self).get(id)
    }

    fn mark_reviewed(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError> {
        (**self).mark_reviewed(id, at)
    }

    fn mark_applied(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError> {
        (**self).mark_applied(id, at)
    }

    fn load_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<DecisionLog>, DecisionLogStoreError> {
        (**self).load_for_period(tenant_id, decision_type, period)
    }
}
