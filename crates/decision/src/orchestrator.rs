//! Escalation across engines, policy application, audit logging and review
//! routing.
//!
//! `decide` never fails: engine and persistence problems degrade to a
//! low-confidence, review-required result instead of surfacing to the caller.

use std::time::Instant;

use chrono::Utc;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, error, warn};

use lojapet_core::{DecisionLogId, DecisionType, TenantId};
use lojapet_learning::signature::{SimilarityConfig, build_signature};
use lojapet_learning::{LearningPattern, PatternStore};

use crate::context::DecisionContext;
use crate::engine::EngineRegistry;
use crate::policy::DecisionPolicy;
use crate::result::{DecisionPayload, DecisionResult};
use crate::store::{DecisionLog, DecisionLogStore};

/// Everything the review queue needs to present one pending decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRequest {
    pub decision_log_id: DecisionLogId,
    pub tenant_id: TenantId,
    pub decision_type: DecisionType,
    pub request_id: lojapet_core::DecisionId,
    /// One-line human-readable summary of the AI decision.
    pub summary: String,
    pub input_signature: String,
    pub ai_decision: JsonValue,
    pub ai_explanation: String,
    pub confidence: u8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewQueueError {
    #[error("review queue unavailable: {0}")]
    Unavailable(String),
}

/// Sink for decisions that need a human. Implemented by the review service;
/// the orchestrator is agnostic to how the queue is stored.
pub trait ReviewQueue: Send + Sync {
    fn enqueue(&self, request: ReviewRequest) -> Result<(), ReviewQueueError>;
}

impl<T> ReviewQueue for std::sync::Arc<T>
where
    T: ReviewQueue + ?Sized,
{
    fn enqueue(&self, request: ReviewRequest) -> Result<(), ReviewQueueError> {
        (**self).enqueue(request)
    }
}

/// Tiered multi-engine decision orchestrator.
pub struct Orchestrator<L, P, Q> {
    registry: EngineRegistry,
    policy: DecisionPolicy,
    log_store: L,
    pattern_store: P,
    review_queue: Q,
    similarity: SimilarityConfig,
}

impl<L, P, Q> Orchestrator<L, P, Q>
where
    L: DecisionLogStore,
    P: PatternStore,
    Q: ReviewQueue,
{
    pub fn new(
        registry: EngineRegistry,
        policy: DecisionPolicy,
        log_store: L,
        pattern_store: P,
        review_queue: Q,
    ) -> Self {
        Self {
            registry,
            policy,
            log_store,
            pattern_store,
            review_queue,
            similarity: SimilarityConfig::default(),
        }
    }

    pub fn with_similarity_config(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    /// Run one decision request end to end.
    ///
    /// Engines are tried strictly in ascending tier order and the first
    /// result meeting the context's confidence floor wins; later tiers are
    /// never invoked after that.
    pub fn decide(&self, context: &DecisionContext) -> DecisionResult {
        let started = Instant::now();
        let patterns = self.load_patterns(context);
        let min_confidence = context.min_confidence();

        let mut selected: Option<DecisionResult> = None;
        for engine in self.registry.engines() {
            if !engine.can_handle(context.decision_type) {
                continue;
            }
            match engine.decide(context, &patterns) {
                Ok(result) => {
                    let score = result.confidence_score;
                    let accepted = score >= min_confidence;
                    debug!(
                        request_id = %context.request_id,
                        engine = engine.name(),
                        tier = engine.tier(),
                        score,
                        accepted,
                        "engine attempt"
                    );
                    selected = Some(result);
                    if accepted {
                        break;
                    }
                }
                Err(err) => {
                    warn!(
                        request_id = %context.request_id,
                        engine = engine.name(),
                        tier = engine.tier(),
                        error = %err,
                        "engine attempt failed; trying next tier"
                    );
                }
            }
        }

        let mut result = selected.unwrap_or_else(|| Self::fallback_result(context));
        result.processing_time_ms = started.elapsed().as_millis() as u64;

        let verdict = self.policy.evaluate(result.confidence_score, context.decision_type, context);
        result.requires_human_review = result.requires_human_review || verdict.requires_human_review;
        result.policy = Some(verdict);

        self.persist_and_route(context, &mut result);
        result
    }

    fn load_patterns(&self, context: &DecisionContext) -> Vec<LearningPattern> {
        match self
            .pattern_store
            .load_active(context.tenant_id, context.decision_type.into())
        {
            Ok(patterns) => patterns,
            Err(err) => {
                // Patterns only boost confidence; deciding without them is safe.
                warn!(
                    request_id = %context.request_id,
                    error = %err,
                    "pattern load failed; deciding without learned patterns"
                );
                Vec::new()
            }
        }
    }

    /// Every engine failed: return an explicit zero-confidence result instead
    /// of guessing.
    fn fallback_result(context: &DecisionContext) -> DecisionResult {
        DecisionResult::new(
            context.request_id,
            context.decision_type,
            DecisionPayload::Generic(JsonValue::Null),
            0,
            "none",
        )
        .with_reason("no engine could produce a result")
        .with_requires_review(true)
        .with_suggested_action("decide manually in the review queue")
    }

    fn persist_and_route(&self, context: &DecisionContext, result: &mut DecisionResult) {
        let signature = build_signature(&context.primary_data.signature_text(), &self.similarity);
        let policy_action = result
            .policy
            .as_ref()
            .map(|p| p.action)
            .unwrap_or(crate::policy::PolicyAction::RequireReview);

        let log = DecisionLog {
            id: DecisionLogId::new(),
            tenant_id: context.tenant_id,
            request_id: context.request_id,
            decision_type: context.decision_type,
            input: serde_json::to_value(context).unwrap_or(JsonValue::Null),
            decision: result.decision.to_json(),
            input_signature: signature.clone(),
            engine_used: result.engine_used.clone(),
            confidence_score: result.confidence_score,
            policy_action,
            requires_review: result.requires_human_review,
            applied: false,
            applied_at: None,
            reviewed: false,
            reviewed_at: None,
            processing_time_ms: result.processing_time_ms,
            created_at: Utc::now(),
        };

        let saved = self.log_store.save(log.clone()).or_else(|first_err| {
            warn!(
                request_id = %context.request_id,
                error = %first_err,
                "decision log write failed; retrying once"
            );
            self.log_store.save(log.clone())
        });

        match saved {
            Ok(log_id) => {
                if result.requires_human_review {
                    let request = ReviewRequest {
                        decision_log_id: log_id,
                        tenant_id: context.tenant_id,
                        decision_type: context.decision_type,
                        request_id: context.request_id,
                        summary: result.decision.summary(),
                        input_signature: signature,
                        ai_decision: result.decision.to_json(),
                        ai_explanation: result.reasons.join("; "),
                        confidence: result.confidence_score,
                    };
                    if let Err(err) = self.review_queue.enqueue(request) {
                        error!(
                            request_id = %context.request_id,
                            error = %err,
                            "review enqueue failed; decision stays logged as review-required"
                        );
                    }
                }
            }
            Err(err) => {
                // The decision must still reach the caller, but nothing may
                // be acted on automatically without an audit row.
                error!(
                    request_id = %context.request_id,
                    error = %err,
                    "decision log unavailable; degrading to review-required"
                );
                result.requires_human_review = true;
                result
                    .reasons
                    .push("audit log unavailable; flagged for manual review".to_string());
            }
        }
    }
}
