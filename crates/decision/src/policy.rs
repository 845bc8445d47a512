//! Maps (score, decision type, thresholds) → what the system may do.
//!
//! Pure function of its inputs. Thresholds come from configuration (and,
//! over time, from trust-report recommendations), never from per-call
//! hard-coding.

use serde::{Deserialize, Serialize};

use lojapet_core::DecisionType;

use crate::context::DecisionContext;

/// Coarse trust classification of the decision core for a scope, derived
/// from historical approval rate. Ordered: later variants trust more.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Learning,
    Developing,
    Reliable,
    Mature,
    Expert,
}

impl MaturityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Learning => "learning",
            MaturityLevel::Developing => "developing",
            MaturityLevel::Reliable => "reliable",
            MaturityLevel::Mature => "mature",
            MaturityLevel::Expert => "expert",
        }
    }
}

/// What the system does with a scored decision, from least to most automated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    Ignore,
    RequireReview,
    Suggest,
    Execute,
}

/// How much detail the audit trail records for a decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    Minimal,
    Standard,
    Detailed,
}

/// Policy verdict attached to a decision result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub action: PolicyAction,
    pub requires_human_review: bool,
    pub audit_level: AuditLevel,
    pub explanation: String,
    pub suggested_next_steps: Vec<String>,
}

/// A decision type marked non-actionable below a score floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreFloor {
    pub decision_type: DecisionType,
    pub floor: u8,
}

/// Policy thresholds. `maturity` keeps the stance conservative until the
/// trust service has re-evaluated the scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub execute_threshold: u8,
    pub review_threshold: u8,
    pub maturity: MaturityLevel,
    pub ignore_floors: Vec<IgnoreFloor>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            execute_threshold: 90,
            review_threshold: 60,
            maturity: MaturityLevel::Learning,
            ignore_floors: Vec::new(),
        }
    }
}

impl PolicyConfig {
    pub fn with_execute_threshold(mut self, execute_threshold: u8) -> Self {
        self.execute_threshold = execute_threshold;
        self
    }

    pub fn with_review_threshold(mut self, review_threshold: u8) -> Self {
        self.review_threshold = review_threshold;
        self
    }

    pub fn with_maturity(mut self, maturity: MaturityLevel) -> Self {
        self.maturity = maturity;
        self
    }

    pub fn with_ignore_floor(mut self, decision_type: DecisionType, floor: u8) -> Self {
        self.ignore_floors.push(IgnoreFloor {
            decision_type,
            floor,
        });
        self
    }

    fn ignore_floor(&self, decision_type: DecisionType) -> Option<u8> {
        self.ignore_floors
            .iter()
            .find(|f| f.decision_type == decision_type)
            .map(|f| f.floor)
    }
}

/// Deterministic gate between confidence and automation.
#[derive(Debug, Clone, Default)]
pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate a confidence score against the configured thresholds.
    ///
    /// The execute threshold never drops below the caller's own
    /// `min_confidence` constraint.
    pub fn evaluate(
        &self,
        confidence_score: u8,
        decision_type: DecisionType,
        context: &DecisionContext,
    ) -> PolicyDecision {
        let execute_threshold = self.config.execute_threshold.max(context.min_confidence());

        if let Some(floor) = self.config.ignore_floor(decision_type) {
            if confidence_score < floor {
                return PolicyDecision {
                    action: PolicyAction::Ignore,
                    requires_human_review: false,
                    audit_level: AuditLevel::Minimal,
                    explanation: format!(
                        "score {confidence_score} below the non-actionable floor {floor} for {decision_type}"
                    ),
                    suggested_next_steps: vec!["discard the suggestion".to_string()],
                };
            }
        }

        if confidence_score < self.config.review_threshold {
            return PolicyDecision {
                action: PolicyAction::RequireReview,
                requires_human_review: true,
                audit_level: AuditLevel::Detailed,
                explanation: format!(
                    "score {confidence_score} below the review threshold {}",
                    self.config.review_threshold
                ),
                suggested_next_steps: vec!["send to the review queue".to_string()],
            };
        }

        // Until the scope is re-evaluated as Reliable or better, nothing is
        // suggested or executed without a human in the loop.
        if self.config.maturity < MaturityLevel::Reliable {
            return PolicyDecision {
                action: PolicyAction::RequireReview,
                requires_human_review: true,
                audit_level: AuditLevel::Detailed,
                explanation: format!(
                    "maturity {} keeps the policy in a conservative stance",
                    self.config.maturity.as_str()
                ),
                suggested_next_steps: vec!["send to the review queue".to_string()],
            };
        }

        if confidence_score >= execute_threshold {
            return PolicyDecision {
                action: PolicyAction::Execute,
                requires_human_review: false,
                audit_level: AuditLevel::Detailed,
                explanation: format!(
                    "score {confidence_score} meets the execute threshold {execute_threshold}"
                ),
                suggested_next_steps: vec!["apply automatically".to_string()],
            };
        }

        PolicyDecision {
            action: PolicyAction::Suggest,
            requires_human_review: false,
            audit_level: AuditLevel::Standard,
            explanation: format!(
                "score {confidence_score} is between review ({}) and execute ({execute_threshold}) thresholds",
                self.config.review_threshold
            ),
            suggested_next_steps: vec!["present as a suggestion".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecisionData, DecisionContext};
    use lojapet_core::TenantId;
    use serde_json::Value as JsonValue;

    fn ctx() -> DecisionContext {
        DecisionContext::new(
            TenantId::new(),
            DecisionType::CategorizeTransaction,
            DecisionData::Generic(JsonValue::Null),
        )
    }

    fn mature_policy() -> DecisionPolicy {
        DecisionPolicy::new(PolicyConfig::default().with_maturity(MaturityLevel::Mature))
    }

    #[test]
    fn low_scores_require_review() {
        let decision = mature_policy().evaluate(45, DecisionType::CategorizeTransaction, &ctx());
        assert_eq!(decision.action, PolicyAction::RequireReview);
        assert!(decision.requires_human_review);
        assert_eq!(decision.audit_level, AuditLevel::Detailed);
    }

    #[test]
    fn mid_band_is_a_suggestion_once_reliable() {
        let decision = mature_policy().evaluate(75, DecisionType::CategorizeTransaction, &ctx());
        assert_eq!(decision.action, PolicyAction::Suggest);
        assert!(!decision.requires_human_review);
    }

    #[test]
    fn high_scores_execute_once_reliable() {
        let decision = mature_policy().evaluate(95, DecisionType::CategorizeTransaction, &ctx());
        assert_eq!(decision.action, PolicyAction::Execute);
        assert!(!decision.requires_human_review);
    }

    #[test]
    fn conservative_maturity_forces_review_even_for_high_scores() {
        let policy = DecisionPolicy::new(PolicyConfig::default());
        let decision = policy.evaluate(97, DecisionType::CategorizeTransaction, &ctx());
        assert_eq!(decision.action, PolicyAction::RequireReview);
    }

    #[test]
    fn caller_min_confidence_raises_the_execute_threshold() {
        let context = ctx().with_min_confidence(95);
        let decision = mature_policy().evaluate(92, DecisionType::CategorizeTransaction, &context);
        assert_eq!(decision.action, PolicyAction::Suggest);

        let decision = mature_policy().evaluate(96, DecisionType::CategorizeTransaction, &context);
        assert_eq!(decision.action, PolicyAction::Execute);
    }

    #[test]
    fn ignore_applies_only_below_the_configured_floor() {
        let policy = DecisionPolicy::new(
            PolicyConfig::default()
                .with_maturity(MaturityLevel::Mature)
                .with_ignore_floor(DecisionType::SuggestProduct, 30),
        );
        let ignored = policy.evaluate(20, DecisionType::SuggestProduct, &ctx());
        assert_eq!(ignored.action, PolicyAction::Ignore);
        assert_eq!(ignored.audit_level, AuditLevel::Minimal);

        let reviewed = policy.evaluate(35, DecisionType::SuggestProduct, &ctx());
        assert_eq!(reviewed.action, PolicyAction::RequireReview);

        // Types without a floor never see Ignore.
        let other = policy.evaluate(5, DecisionType::CategorizeTransaction, &ctx());
        assert_eq!(other.action, PolicyAction::RequireReview);
    }

    #[test]
    fn action_is_monotone_in_the_score() {
        let policy = mature_policy();
        let context = ctx();
        let mut last = PolicyAction::Ignore;
        for score in 0..=100u8 {
            let action = policy
                .evaluate(score, DecisionType::CategorizeTransaction, &context)
                .action;
            assert!(action >= last, "action regressed at score {score}");
            last = action;
        }
    }
}
