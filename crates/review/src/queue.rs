//! Pending review queue entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lojapet_core::{DecisionId, DecisionLogId, DecisionType, ReviewId, TenantId, UserId};
use lojapet_decision::ReviewRequest;
use lojapet_events::ReviewAction;

/// Lifecycle of a queue entry. Resolved states are terminal: once a verdict
/// lands, later submissions overwrite the verdict but never reopen the entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Corrected,
    Rejected,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

impl From<ReviewAction> for ReviewStatus {
    fn from(action: ReviewAction) -> Self {
        match action {
            ReviewAction::Approved => ReviewStatus::Approved,
            ReviewAction::Corrected => ReviewStatus::Corrected,
            ReviewAction::Rejected => ReviewStatus::Rejected,
        }
    }
}

/// One decision waiting for (or resolved by) a human verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReview {
    pub id: ReviewId,
    pub decision_log_id: DecisionLogId,
    pub tenant_id: TenantId,
    pub decision_type: DecisionType,
    pub request_id: DecisionId,
    pub summary: String,
    pub input_signature: String,
    pub ai_decision: JsonValue,
    pub ai_explanation: String,
    pub confidence: u8,
    pub status: ReviewStatus,
    pub resolved_by: Option<UserId>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PendingReview {
    /// Build a fresh queue entry from the orchestrator's routing request.
    pub fn from_request(request: ReviewRequest) -> Self {
        Self {
            id: ReviewId::new(),
            decision_log_id: request.decision_log_id,
            tenant_id: request.tenant_id,
            decision_type: request.decision_type,
            request_id: request.request_id,
            summary: request.summary,
            input_signature: request.input_signature,
            ai_decision: request.ai_decision,
            ai_explanation: request.ai_explanation,
            confidence: request.confidence,
            status: ReviewStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(ReviewStatus::Approved.is_terminal());
        assert!(ReviewStatus::Corrected.is_terminal());
        assert!(ReviewStatus::Rejected.is_terminal());
    }
}
