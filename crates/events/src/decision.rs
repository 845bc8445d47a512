//! Integration events at the decision-core boundary.
//!
//! Payloads are carried as `serde_json::Value` so this crate stays agnostic
//! to the typed decision payloads; consumers deserialize what they know.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use lojapet_core::{DecisionId, DecisionLogId, DecisionType, TenantId, UserId};

use crate::event::Event;

/// Verdict a human reviewer can give on an AI decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approved,
    Corrected,
    Rejected,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approved => "approved",
            ReviewAction::Corrected => "corrected",
            ReviewAction::Rejected => "rejected",
        }
    }
}

/// Event: a human reviewed an AI decision.
///
/// Carries the **pre-review** decision verbatim; learning compares what the
/// engine said against what the human said, so the original must not be
/// rewritten on the way through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionReviewedEvent {
    pub event_id: Uuid,
    pub decision_id: DecisionId,
    pub decision_log_id: DecisionLogId,
    pub decision_type: DecisionType,
    pub tenant_id: TenantId,
    pub reviewer_id: UserId,
    pub action: ReviewAction,
    pub original_decision: JsonValue,
    pub confidence_score_original: u8,
    /// Normalized feature fingerprint of the original request, computed at
    /// decision time. Learning keys patterns on it.
    pub input_signature: String,
    pub corrected_data: Option<JsonValue>,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a decided outcome was applied to the business system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionAppliedEvent {
    pub decision_id: DecisionId,
    pub decision_log_id: DecisionLogId,
    pub tenant_id: TenantId,
    pub applied_decision: JsonValue,
    pub applied_by: Option<UserId>,
    pub applied_automatically: bool,
    pub application_result: String,
    pub occurred_at: DateTime<Utc>,
}

/// Severity of a guardrail breach.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
    Emergency,
}

/// Event: a metric guardrail was breached for a tenant/decision-type scope.
///
/// Consumers may force review-only mode or block automation for the scope;
/// the decision core itself only reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAlertEvent {
    pub severity: AlertSeverity,
    pub tenant_id: TenantId,
    pub decision_type: Option<DecisionType>,
    pub guardrail_type: String,
    pub current_value: f64,
    pub threshold_violated: f64,
    pub metrics_snapshot: JsonValue,
    pub recommended_action: String,
    pub circuit_breaker_triggered: bool,
    pub occurred_at: DateTime<Utc>,
}

/// All decision-core integration events, as carried on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionEvent {
    Reviewed(DecisionReviewedEvent),
    Applied(DecisionAppliedEvent),
    Alert(AiAlertEvent),
}

impl Event for DecisionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DecisionEvent::Reviewed(_) => "decision.reviewed",
            DecisionEvent::Applied(_) => "decision.applied",
            DecisionEvent::Alert(_) => "decision.guardrail_alert",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DecisionEvent::Reviewed(e) => e.occurred_at,
            DecisionEvent::Applied(e) => e.occurred_at,
            DecisionEvent::Alert(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable() {
        let reviewed = DecisionEvent::Reviewed(DecisionReviewedEvent {
            event_id: Uuid::nil(),
            decision_id: DecisionId::new(),
            decision_log_id: DecisionLogId::new(),
            decision_type: DecisionType::CategorizeTransaction,
            tenant_id: TenantId::new(),
            reviewer_id: UserId::new(),
            action: ReviewAction::Approved,
            original_decision: JsonValue::Null,
            confidence_score_original: 80,
            input_signature: "racao premium".to_string(),
            corrected_data: None,
            comment: None,
            occurred_at: Utc::now(),
        });
        assert_eq!(reviewed.event_type(), "decision.reviewed");
        assert_eq!(reviewed.version(), 1);
    }

    #[test]
    fn severity_orders_warning_below_emergency() {
        assert!(AlertSeverity::Warning < AlertSeverity::Critical);
        assert!(AlertSeverity::Critical < AlertSeverity::Emergency);
    }
}
