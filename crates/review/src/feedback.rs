//! Append-only record of human verdicts on AI decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use lojapet_core::{DecisionLogId, DecisionType, TenantId, UserId};
use lojapet_events::ReviewAction;

/// One review submission, recorded verbatim.
///
/// Every submission appends a row, including repeat verdicts on an already
/// resolved decision; the trust metrics count the latest verdict per decision,
/// but the full history stays auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLog {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub decision_log_id: DecisionLogId,
    pub decision_type: DecisionType,
    pub reviewer_id: UserId,
    pub action: ReviewAction,
    /// The AI decision exactly as it stood before review.
    pub original_decision: JsonValue,
    pub confidence_score_original: u8,
    pub corrected_data: Option<JsonValue>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
