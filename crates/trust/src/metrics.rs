//! Aggregated decision-quality numbers for one tenant/type/period scope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use lojapet_core::{DecisionLogId, DecisionType, TenantId};
use lojapet_decision::{DecisionLog, Period, PolicyAction};
use lojapet_events::ReviewAction;
use lojapet_review::FeedbackLog;

/// Snapshot of how the decision core performed in a scope.
///
/// All rates are percentages in \[0, 100\]. Derived purely from the decision
/// and feedback logs; recomputing over the same rows always yields the same
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPerformanceMetrics {
    pub tenant_id: TenantId,
    pub decision_type: Option<DecisionType>,
    pub period: Period,
    pub total_decisions: u64,
    pub reviewed_decisions: u64,
    pub approved: u64,
    pub corrected: u64,
    pub rejected: u64,
    /// Share of reviewed decisions the human approved as-is.
    pub approval_rate: f64,
    pub correction_rate: f64,
    pub rejection_rate: f64,
    /// Share of all decisions the policy let through without a human.
    pub automation_rate: f64,
    /// Share of all decisions routed to the review queue.
    pub human_review_rate: f64,
    pub avg_confidence: f64,
    pub avg_processing_ms: f64,
}

impl AiPerformanceMetrics {
    /// Compute the snapshot from raw log rows.
    ///
    /// When the same decision was reviewed more than once, only the latest
    /// verdict counts; rows outside the scope are ignored.
    pub fn compute(
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: Period,
        decisions: &[DecisionLog],
        feedback: &[FeedbackLog],
    ) -> Self {
        let in_scope = |log: &&DecisionLog| {
            log.tenant_id == tenant_id
                && decision_type.is_none_or(|t| log.decision_type == t)
                && period.contains(log.created_at)
        };
        let scoped: Vec<&DecisionLog> = decisions.iter().filter(in_scope).collect();

        let mut latest_verdict: HashMap<DecisionLogId, &FeedbackLog> = HashMap::new();
        for row in feedback {
            if row.tenant_id != tenant_id
                || decision_type.is_some_and(|t| row.decision_type != t)
                || !period.contains(row.created_at)
            {
                continue;
            }
            match latest_verdict.get(&row.decision_log_id) {
                Some(existing) if existing.created_at >= row.created_at => {}
                _ => {
                    latest_verdict.insert(row.decision_log_id, row);
                }
            }
        }

        let total = scoped.len() as u64;
        let reviewed = latest_verdict.len() as u64;
        let count_action = |action: ReviewAction| {
            latest_verdict.values().filter(|f| f.action == action).count() as u64
        };
        let approved = count_action(ReviewAction::Approved);
        let corrected = count_action(ReviewAction::Corrected);
        let rejected = count_action(ReviewAction::Rejected);

        let rate = |part: u64, whole: u64| {
            if whole == 0 {
                0.0
            } else {
                part as f64 / whole as f64 * 100.0
            }
        };

        let automated = scoped
            .iter()
            .filter(|l| l.policy_action == PolicyAction::Execute)
            .count() as u64;
        let routed = scoped.iter().filter(|l| l.requires_review).count() as u64;

        let avg = |values: Vec<f64>| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        Self {
            tenant_id,
            decision_type,
            period,
            total_decisions: total,
            reviewed_decisions: reviewed,
            approved,
            corrected,
            rejected,
            approval_rate: rate(approved, reviewed),
            correction_rate: rate(corrected, reviewed),
            rejection_rate: rate(rejected, reviewed),
            automation_rate: rate(automated, total),
            human_review_rate: rate(routed, total),
            avg_confidence: avg(scoped.iter().map(|l| f64::from(l.confidence_score)).collect()),
            avg_processing_ms: avg(scoped.iter().map(|l| l.processing_time_ms as f64).collect()),
        }
    }

    /// Distance between what the core believed and what humans confirmed.
    /// Large gaps mean the confidence scores cannot be trusted at face value.
    pub fn confidence_gap(&self) -> f64 {
        if self.reviewed_decisions == 0 {
            0.0
        } else {
            (self.avg_confidence - self.approval_rate).abs()
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_decisions > 0
    }
}
