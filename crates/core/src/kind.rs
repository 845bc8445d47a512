//! Closed sets of automated decision kinds and learning pattern kinds.
//!
//! `DecisionType` is deliberately a **closed enum**: every subsystem that asks
//! the decision core for help must name one of these kinds, and policy/metrics
//! are keyed on them. Adding a new kind is an explicit schema change.

use serde::{Deserialize, Serialize};

/// Kind of automated decision the core can be asked to make.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Categorize a bank/card transaction into a chart-of-accounts category.
    CategorizeTransaction,
    /// Suggest a product for a customer (cross-sell at point of sale).
    SuggestProduct,
    /// Match an incoming payment against an open receivable.
    MatchPayment,
}

impl DecisionType {
    /// Stable wire name (used in logs, metrics keys and event payloads).
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::CategorizeTransaction => "categorize_transaction",
            DecisionType::SuggestProduct => "suggest_product",
            DecisionType::MatchPayment => "match_payment",
        }
    }
}

impl core::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of learning pattern. Coarser than `DecisionType`: several decision
/// kinds may feed the same pattern family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    TransactionCategory,
    ProductAffinity,
    PaymentMatch,
}

impl From<DecisionType> for PatternType {
    fn from(value: DecisionType) -> Self {
        match value {
            DecisionType::CategorizeTransaction => PatternType::TransactionCategory,
            DecisionType::SuggestProduct => PatternType::ProductAffinity,
            DecisionType::MatchPayment => PatternType::PaymentMatch,
        }
    }
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::TransactionCategory => "transaction_category",
            PatternType::ProductAffinity => "product_affinity",
            PatternType::PaymentMatch => "payment_match",
        }
    }
}

impl core::fmt::Display for PatternType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_decision_type_maps_to_a_pattern_type() {
        assert_eq!(
            PatternType::from(DecisionType::CategorizeTransaction),
            PatternType::TransactionCategory
        );
        assert_eq!(
            PatternType::from(DecisionType::SuggestProduct),
            PatternType::ProductAffinity
        );
        assert_eq!(
            PatternType::from(DecisionType::MatchPayment),
            PatternType::PaymentMatch
        );
    }
}
