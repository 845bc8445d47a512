//! Scored, explained output of one engine attempt.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lojapet_core::{DecisionId, DecisionType};

use crate::policy::PolicyDecision;

/// Summary value used when a payload has no human-readable headline field.
pub const UNDECIDED_SUMMARY: &str = "indefinido";

/// Confidence band derived from the 0-100 score.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => ConfidenceLevel::VeryLow,
            40..=59 => ConfidenceLevel::Low,
            60..=79 => ConfidenceLevel::Medium,
            80..=89 => ConfidenceLevel::High,
            _ => ConfidenceLevel::VeryHigh,
        }
    }
}

/// One justification unit contributing to a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: String,
    pub value: String,
    /// Relative strength in \[0, 1\].
    pub weight: f64,
    pub explanation: String,
}

impl Evidence {
    pub fn new(
        source: impl Into<String>,
        value: impl Into<String>,
        weight: f64,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            value: value.into(),
            weight,
            explanation: explanation.into(),
        }
    }
}

/// A runner-up the engine considered and set aside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub option: String,
    pub confidence: u8,
    pub reason_rejected: String,
}

/// Typed decision output, one shape per decision type, with a generic escape
/// hatch for open-ended engine outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionPayload {
    Category {
        category: String,
        transaction_kind: Option<String>,
        beneficiary: Option<String>,
    },
    ProductSuggestion {
        product: String,
        complements: Vec<String>,
    },
    PaymentMatch {
        invoice_ref: String,
        amount_cents: i64,
    },
    Generic(JsonValue),
}

impl DecisionPayload {
    /// One-line human-readable summary: the first present headline field,
    /// else `"indefinido"`.
    pub fn summary(&self) -> String {
        match self {
            DecisionPayload::Category { category, .. } => category.clone(),
            DecisionPayload::ProductSuggestion { product, .. } => product.clone(),
            DecisionPayload::PaymentMatch { invoice_ref, .. } => invoice_ref.clone(),
            DecisionPayload::Generic(value) => {
                for key in ["category", "product", "match", "option"] {
                    if let Some(v) = value.get(key).and_then(JsonValue::as_str) {
                        return v.to_string();
                    }
                }
                UNDECIDED_SUMMARY.to_string()
            }
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

/// Result of one engine attempt.
///
/// Produced once per attempt; the orchestrator keeps only the accepted one
/// and annotates it with the policy verdict before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub request_id: DecisionId,
    pub decision_type: DecisionType,
    pub decision: DecisionPayload,
    pub confidence_score: u8,
    pub confidence_level: ConfidenceLevel,
    /// Ordered, human-readable reasoning steps.
    pub reasons: Vec<String>,
    pub evidence: Vec<Evidence>,
    pub alternatives: Vec<Alternative>,
    pub engine_used: String,
    pub processing_time_ms: u64,
    pub requires_human_review: bool,
    pub suggested_actions: Vec<String>,
    /// Filled in by the orchestrator after policy evaluation.
    pub policy: Option<PolicyDecision>,
}

impl DecisionResult {
    pub fn new(
        request_id: DecisionId,
        decision_type: DecisionType,
        decision: DecisionPayload,
        confidence_score: u8,
        engine_used: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            decision_type,
            decision,
            confidence_score,
            confidence_level: ConfidenceLevel::from_score(confidence_score),
            reasons: Vec::new(),
            evidence: Vec::new(),
            alternatives: Vec::new(),
            engine_used: engine_used.into(),
            processing_time_ms: 0,
            requires_human_review: false,
            suggested_actions: Vec::new(),
            policy: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<Alternative>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_processing_time_ms(mut self, processing_time_ms: u64) -> Self {
        self.processing_time_ms = processing_time_ms;
        self
    }

    pub fn with_requires_review(mut self, requires_human_review: bool) -> Self {
        self.requires_human_review = requires_human_review;
        self
    }

    pub fn with_suggested_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_actions.push(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confidence_bands_match_the_documented_cutoffs() {
        assert_eq!(ConfidenceLevel::from_score(0), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(39), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(40), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(59), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(60), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(79), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(80), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(89), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(90), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(100), ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn summary_prefers_typed_headline_fields() {
        let payload = DecisionPayload::Category {
            category: "alimentacao".to_string(),
            transaction_kind: None,
            beneficiary: None,
        };
        assert_eq!(payload.summary(), "alimentacao");
    }

    #[test]
    fn generic_summary_walks_the_preferred_key_list() {
        let payload = DecisionPayload::Generic(json!({"option": "banho e tosa"}));
        assert_eq!(payload.summary(), "banho e tosa");

        let empty = DecisionPayload::Generic(json!({"note": "?"}));
        assert_eq!(empty.summary(), UNDECIDED_SUMMARY);
    }
}
