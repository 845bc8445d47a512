//! Weighted aggregation of confidence signals into one 0-100 score.
//!
//! Pure and deterministic: no I/O, no clock, no hidden state. Malformed
//! inputs are a caller/engine bug and fail loudly instead of being corrected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lojapet_core::DecisionType;

/// Where a confidence signal came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    RuleBased,
    PatternLearned,
    HistoricalAccuracy,
    KeywordMatch,
    Similarity,
    ModelConfidence,
    Consensus,
}

/// One weighted confidence signal. Transient: consumed by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInput {
    pub source: ConfidenceSource,
    /// 0-100.
    pub score: u8,
    /// Relative weight in \[0, 1\].
    pub weight: f64,
    pub explanation: String,
}

impl ConfidenceInput {
    pub fn new(
        source: ConfidenceSource,
        score: u8,
        weight: f64,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            source,
            score,
            weight,
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("no confidence inputs provided")]
    Empty,

    #[error("invalid confidence input at index {index}: {reason}")]
    InvalidInput { index: usize, reason: String },
}

/// Per-source weight override for one decision type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightOverride {
    pub decision_type: DecisionType,
    pub source: ConfidenceSource,
    pub weight: f64,
}

/// Calculator configuration: which decision types demand a rule-based signal
/// and any per-type weight table overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Decision types penalized when no rule-based source participated.
    pub requires_rule_source: Vec<DecisionType>,
    pub weight_overrides: Vec<WeightOverride>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            requires_rule_source: vec![DecisionType::CategorizeTransaction],
            weight_overrides: Vec::new(),
        }
    }
}

impl CalculatorConfig {
    fn requires_rule(&self, decision_type: DecisionType) -> bool {
        self.requires_rule_source.contains(&decision_type)
    }

    fn weight_for(&self, decision_type: DecisionType, input: &ConfidenceInput) -> f64 {
        self.weight_overrides
            .iter()
            .find(|o| o.decision_type == decision_type && o.source == input.source)
            .map(|o| o.weight)
            .unwrap_or(input.weight)
    }
}

/// Aggregates weighted confidence signals with penalty heuristics.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceCalculator {
    config: CalculatorConfig,
}

impl ConfidenceCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Weighted mean of the inputs, minus penalties, clamped to \[0, 100\].
    ///
    /// Penalties:
    /// - discordance, keyed on the max-min score spread (>10 / >20 / >30
    ///   subtract 5 / 10 / 15);
    /// - missing rule-based source for decision types that require one (-10);
    /// - rule-based source present but scoring below 50 (-20).
    pub fn calculate(
        &self,
        decision_type: DecisionType,
        inputs: &[ConfidenceInput],
    ) -> Result<f64, ConfidenceError> {
        if inputs.is_empty() {
            return Err(ConfidenceError::Empty);
        }

        let mut weights = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            if input.score > 100 {
                return Err(ConfidenceError::InvalidInput {
                    index,
                    reason: format!("score {} is outside 0-100", input.score),
                });
            }
            let weight = self.config.weight_for(decision_type, input);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ConfidenceError::InvalidInput {
                    index,
                    reason: format!("weight {weight} is outside [0, 1]"),
                });
            }
            weights.push(weight);
        }

        let total_weight: f64 = weights.iter().sum();
        let normalized: Vec<f64> = if total_weight == 0.0 {
            // Nothing claimed any weight; treat all signals as peers.
            vec![1.0 / inputs.len() as f64; inputs.len()]
        } else {
            weights.iter().map(|w| w / total_weight).collect()
        };

        let mut score: f64 = inputs
            .iter()
            .zip(&normalized)
            .map(|(input, w)| f64::from(input.score) * w)
            .sum();

        score -= self.discordance_penalty(inputs);
        score -= self.rule_source_penalty(decision_type, inputs);

        Ok(score.clamp(0.0, 100.0))
    }

    fn discordance_penalty(&self, inputs: &[ConfidenceInput]) -> f64 {
        let max = inputs.iter().map(|i| i.score).max().unwrap_or(0);
        let min = inputs.iter().map(|i| i.score).min().unwrap_or(0);
        match max - min {
            spread if spread > 30 => 15.0,
            spread if spread > 20 => 10.0,
            spread if spread > 10 => 5.0,
            _ => 0.0,
        }
    }

    fn rule_source_penalty(&self, decision_type: DecisionType, inputs: &[ConfidenceInput]) -> f64 {
        let rule_input = inputs
            .iter()
            .find(|i| i.source == ConfidenceSource::RuleBased);
        match rule_input {
            None if self.config.requires_rule(decision_type) => 10.0,
            Some(rule) if rule.score < 50 => 20.0,
            _ => 0.0,
        }
    }
}
