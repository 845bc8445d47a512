//! Reference engine: deterministic keyword rules for transaction
//! categorization (tier 1).

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lojapet_core::DecisionType;
use lojapet_learning::pattern::best_match;
use lojapet_learning::signature::{SimilarityConfig, build_signature, normalize_text};
use lojapet_learning::LearningPattern;

use crate::context::{DecisionContext, DecisionData, TransactionFlow};
use crate::engine::{DecisionEngine, EngineError};
use crate::result::{Alternative, DecisionPayload, DecisionResult, Evidence};

/// Base confidence when a rule matches.
const BASE_CONFIDENCE: u8 = 75;
/// Bonus when the transaction flow matches the rule's expected polarity.
const POLARITY_BONUS: u8 = 10;
/// Bonus when a transaction-kind token was detected.
const KIND_BONUS: u8 = 5;
/// A rule never claims certainty.
const MAX_CONFIDENCE: u8 = 95;
/// Confidence when nothing matched.
const NO_MATCH_CONFIDENCE: u8 = 20;

/// One keyword→category rule with an expected money-flow polarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub category: String,
    pub expected_flow: TransactionFlow,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], category: &str, expected_flow: TransactionFlow) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: category.to_string(),
            expected_flow,
        }
    }
}

/// Deterministic keyword/rule engine for bank transaction categorization.
///
/// Matches normalized description tokens against the rule table, detects a
/// transaction-kind token and a beneficiary, and folds any matching learning
/// pattern in as a confidence boost.
pub struct RuleEngine {
    rules: Vec<KeywordRule>,
    kinds: Vec<&'static str>,
    beneficiary_prefixes: Vec<&'static str>,
    similarity: SimilarityConfig,
}

impl RuleEngine {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            kinds: vec![
                "pix",
                "ted",
                "doc",
                "boleto",
                "cartao",
                "credito",
                "debito",
                "dinheiro",
                "transferencia",
            ],
            beneficiary_prefixes: vec![
                "pix para",
                "pix de",
                "ted para",
                "ted de",
                "transferencia para",
                "pagamento para",
                "pagamento de",
                "boleto",
            ],
            similarity: SimilarityConfig::default(),
        }
    }

    /// Pet-shop chart-of-accounts rule table.
    pub fn with_default_rules() -> Self {
        Self::new(vec![
            KeywordRule::new(
                &["racao", "petisco", "fornecedor", "distribuidora"],
                "compras_estoque",
                TransactionFlow::Outflow,
            ),
            KeywordRule::new(&["aluguel", "condominio"], "ocupacao", TransactionFlow::Outflow),
            KeywordRule::new(&["salario", "folha", "prolabore"], "pessoal", TransactionFlow::Outflow),
            KeywordRule::new(
                &["energia", "luz", "agua", "internet", "telefone"],
                "utilidades",
                TransactionFlow::Outflow,
            ),
            KeywordRule::new(
                &["vacina", "veterinario", "medicamento"],
                "saude_animal",
                TransactionFlow::Outflow,
            ),
            KeywordRule::new(
                &["imposto", "darf", "tributo", "simples"],
                "impostos",
                TransactionFlow::Outflow,
            ),
            KeywordRule::new(
                &["tarifa", "juros", "anuidade"],
                "despesas_bancarias",
                TransactionFlow::Outflow,
            ),
            KeywordRule::new(
                &["venda", "recebimento", "cliente"],
                "receita_vendas",
                TransactionFlow::Inflow,
            ),
            KeywordRule::new(
                &["banho", "tosa", "estetica"],
                "receita_servicos",
                TransactionFlow::Inflow,
            ),
        ])
    }

    pub fn with_similarity_config(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    fn detect_kind(&self, tokens: &BTreeSet<&str>) -> Option<String> {
        self.kinds
            .iter()
            .find(|k| tokens.contains(**k))
            .map(|k| k.to_string())
    }

    /// Strip a known transfer prefix and keep the next few tokens as the
    /// counterparty name. Leading document numbers are dropped.
    fn extract_beneficiary(&self, normalized: &str) -> Option<String> {
        for prefix in &self.beneficiary_prefixes {
            if let Some(rest) = normalized.strip_prefix(prefix) {
                let name: Vec<&str> = rest
                    .split_whitespace()
                    .skip_while(|t| t.chars().all(|c| c.is_ascii_digit()))
                    .take(3)
                    .collect();
                if !name.is_empty() {
                    return Some(name.join(" "));
                }
            }
        }
        None
    }

    fn matching_rules<'a>(&'a self, tokens: &BTreeSet<&str>) -> Vec<(&'a KeywordRule, &'a str)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.keywords
                    .iter()
                    .find(|k| tokens.contains(k.as_str()))
                    .map(|k| (rule, k.as_str()))
            })
            .collect()
    }
}

impl DecisionEngine for RuleEngine {
    fn name(&self) -> &'static str {
        "rule_engine"
    }

    fn tier(&self) -> u8 {
        1
    }

    fn can_handle(&self, decision_type: DecisionType) -> bool {
        decision_type == DecisionType::CategorizeTransaction
    }

    fn decide(
        &self,
        context: &DecisionContext,
        patterns: &[LearningPattern],
    ) -> Result<DecisionResult, EngineError> {
        let started = Instant::now();

        let DecisionData::Transaction {
            description, flow, ..
        } = &context.primary_data
        else {
            return Err(EngineError::UnsupportedInput(
                "rule engine needs transaction data".to_string(),
            ));
        };

        let normalized = normalize_text(description);
        let tokens: BTreeSet<&str> = normalized.split_whitespace().collect();
        let kind = self.detect_kind(&tokens);
        let beneficiary = self.extract_beneficiary(&normalized);

        let matched = self.matching_rules(&tokens);
        let Some((rule, keyword)) = matched.first().copied() else {
            debug!(request_id = %context.request_id, "no categorization rule matched");
            let mut result = DecisionResult::new(
                context.request_id,
                context.decision_type,
                DecisionPayload::Category {
                    category: "indefinido".to_string(),
                    transaction_kind: kind.clone(),
                    beneficiary,
                },
                NO_MATCH_CONFIDENCE,
                self.name(),
            )
            .with_reason("no keyword rule matched the description")
            .with_requires_review(true)
            .with_suggested_action("categorize manually and approve to create a pattern");
            if let Some(kind) = kind {
                result = result.with_evidence(Evidence::new(
                    "keyword_match",
                    kind,
                    0.1,
                    "transaction kind token detected",
                ));
            }
            return Ok(result.with_processing_time_ms(started.elapsed().as_millis() as u64));
        };

        let mut score = u16::from(BASE_CONFIDENCE);
        let mut result = DecisionResult::new(
            context.request_id,
            context.decision_type,
            DecisionPayload::Category {
                category: rule.category.clone(),
                transaction_kind: kind.clone(),
                beneficiary: beneficiary.clone(),
            },
            BASE_CONFIDENCE,
            self.name(),
        )
        .with_reason(format!("keyword '{keyword}' maps to category '{}'", rule.category))
        .with_evidence(Evidence::new(
            "rule_based",
            keyword,
            0.6,
            format!("rule table entry for '{}'", rule.category),
        ));

        if *flow == rule.expected_flow {
            score += u16::from(POLARITY_BONUS);
            result = result
                .with_reason("transaction flow matches the rule polarity")
                .with_evidence(Evidence::new(
                    "rule_based",
                    "polarity",
                    0.2,
                    "money direction agrees with the expected category direction",
                ));
        }

        if let Some(kind) = &kind {
            score += u16::from(KIND_BONUS);
            result = result.with_evidence(Evidence::new(
                "keyword_match",
                kind.clone(),
                0.1,
                "transaction kind token detected",
            ));
        }

        let signature = build_signature(description, &self.similarity);
        if let Some((pattern, sim)) =
            best_match(patterns, &signature, Some(rule.category.as_str()), &self.similarity)
        {
            let boost = pattern.confidence_boost.min(30);
            score += u16::from(boost);
            result = result
                .with_reason(format!("learned pattern reinforces this category (+{boost})"))
                .with_evidence(Evidence::new(
                    "pattern_learned",
                    pattern.input_signature.clone(),
                    0.3,
                    format!("pattern matched with similarity {sim:.2}"),
                ));
        }

        result.confidence_score = score.min(u16::from(MAX_CONFIDENCE)) as u8;
        result.confidence_level =
            crate::result::ConfidenceLevel::from_score(result.confidence_score);

        let alternatives: Vec<Alternative> = matched
            .iter()
            .skip(1)
            .filter(|(r, _)| r.category != rule.category)
            .map(|(r, k)| Alternative {
                option: r.category.clone(),
                confidence: 50,
                reason_rejected: format!("keyword '{k}' matched a later rule"),
            })
            .collect();

        Ok(result
            .with_alternatives(alternatives)
            .with_processing_time_ms(started.elapsed().as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use lojapet_core::{PatternType, TenantId};

    fn transaction_ctx(description: &str, flow: TransactionFlow) -> DecisionContext {
        DecisionContext::new(
            TenantId::new(),
            DecisionType::CategorizeTransaction,
            DecisionData::Transaction {
                description: description.to_string(),
                amount_cents: if flow == TransactionFlow::Outflow { -15_000 } else { 15_000 },
                flow,
                account: None,
            },
        )
    }

    fn engine() -> RuleEngine {
        RuleEngine::with_default_rules()
    }

    #[test]
    fn keyword_polarity_and_kind_add_up_to_90() {
        let ctx = transaction_ctx("pix para distribuidora racao premium", TransactionFlow::Outflow);
        let result = engine().decide(&ctx, &[]).unwrap();
        assert_eq!(result.confidence_score, 90);
        match &result.decision {
            DecisionPayload::Category {
                category,
                transaction_kind,
                beneficiary,
            } => {
                assert_eq!(category, "compras_estoque");
                assert_eq!(transaction_kind.as_deref(), Some("pix"));
                assert_eq!(beneficiary.as_deref(), Some("distribuidora racao premium"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert!(!result.requires_human_review);
    }

    #[test]
    fn wrong_polarity_loses_the_bonus() {
        let ctx = transaction_ctx("pix racao estorno", TransactionFlow::Inflow);
        let result = engine().decide(&ctx, &[]).unwrap();
        // 75 base + 5 kind, no polarity bonus.
        assert_eq!(result.confidence_score, 80);
    }

    #[test]
    fn unknown_description_degrades_to_low_confidence_review() {
        let ctx = transaction_ctx("lancamento avulso 9921", TransactionFlow::Outflow);
        let result = engine().decide(&ctx, &[]).unwrap();
        assert_eq!(result.confidence_score, 20);
        assert!(result.requires_human_review);
        match &result.decision {
            DecisionPayload::Category { category, .. } => assert_eq!(category, "indefinido"),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn pattern_boost_is_capped_at_95() {
        let ctx = transaction_ctx("pix para distribuidora racao premium", TransactionFlow::Outflow);
        let mut pattern = LearningPattern::new(
            ctx.tenant_id,
            PatternType::TransactionCategory,
            build_signature("pix para distribuidora racao premium", &SimilarityConfig::default()),
            json!({"category": "compras_estoque"}),
            Utc::now(),
        );
        pattern.confidence_boost = 30;

        let result = engine().decide(&ctx, &[pattern]).unwrap();
        // 90 from rules/kind + 30 boost, capped.
        assert_eq!(result.confidence_score, 95);
        assert!(result
            .evidence
            .iter()
            .any(|e| e.source == "pattern_learned"));
    }

    #[test]
    fn non_transaction_data_is_unsupported() {
        let ctx = DecisionContext::new(
            TenantId::new(),
            DecisionType::CategorizeTransaction,
            DecisionData::Sale {
                customer_ref: None,
                recent_products: vec![],
            },
        );
        let err = engine().decide(&ctx, &[]).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedInput(_)));
    }

    #[test]
    fn cannot_handle_other_decision_types() {
        assert!(engine().can_handle(DecisionType::CategorizeTransaction));
        assert!(!engine().can_handle(DecisionType::SuggestProduct));
        assert!(!engine().can_handle(DecisionType::MatchPayment));
    }
}
