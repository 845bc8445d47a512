//! Review-event consumer: turns human verdicts into pattern updates.

use thiserror::Error;
use tracing::{debug, info};

use lojapet_core::{PatternId, PatternType};
use lojapet_events::{DecisionReviewedEvent, ReviewAction};

use crate::pattern::{LearningPattern, best_match};
use crate::signature::{SimilarityConfig, coarse_category};
use crate::store::{PatternStore, PatternStoreError};

#[derive(Debug, Error)]
pub enum LearningError {
    #[error(transparent)]
    Store(#[from] PatternStoreError),

    /// A `corrected` verdict arrived without the corrected payload. This is a
    /// producer bug; the event is unusable.
    #[error("corrected review event {0} is missing corrected_data")]
    MissingCorrectedData(String),
}

/// What a review event did to the pattern base.
#[derive(Debug, Clone, PartialEq)]
pub enum LearningOutcome {
    Updated {
        pattern_id: PatternId,
        created: bool,
        is_active: bool,
        success_rate: f64,
    },
    /// A rejection with no matching pattern: there is no right answer to
    /// learn and no pattern to decay.
    NothingToLearn,
}

/// Consumes `DecisionReviewedEvent`s and reinforces/decays learning patterns.
pub struct LearningService<S> {
    store: S,
    config: SimilarityConfig,
}

impl<S: PatternStore> LearningService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SimilarityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SimilarityConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply one reviewer verdict to the tenant's pattern base.
    pub fn process_review_event(
        &self,
        event: &DecisionReviewedEvent,
    ) -> Result<LearningOutcome, LearningError> {
        let pattern_type = PatternType::from(event.decision_type);
        let category = coarse_category(&event.original_decision).map(str::to_string);

        let patterns = self.store.load_active(event.tenant_id, pattern_type)?;
        let matched = best_match(
            &patterns,
            &event.input_signature,
            category.as_deref(),
            &self.config,
        );

        let (mut pattern, created) = match matched {
            Some((p, sim)) => {
                debug!(
                    pattern_id = %p.id,
                    similarity = sim,
                    action = event.action.as_str(),
                    "matched existing learning pattern"
                );
                (p.clone(), false)
            }
            None => {
                if event.action == ReviewAction::Rejected {
                    // Nothing to decay, nothing learned about the right answer.
                    return Ok(LearningOutcome::NothingToLearn);
                }
                let seed_output = match event.action {
                    ReviewAction::Corrected => self.required_correction(event)?.clone(),
                    _ => event.original_decision.clone(),
                };
                let p = LearningPattern::new(
                    event.tenant_id,
                    pattern_type,
                    event.input_signature.clone(),
                    seed_output,
                    event.occurred_at,
                );
                info!(pattern_id = %p.id, tenant_id = %event.tenant_id, "created learning pattern");
                (p, true)
            }
        };

        match event.action {
            ReviewAction::Approved => pattern.record_approval(event.occurred_at),
            ReviewAction::Corrected => {
                let corrected = self.required_correction(event)?.clone();
                pattern.record_correction(corrected, event.occurred_at);
            }
            ReviewAction::Rejected => pattern.record_rejection(event.occurred_at),
        }

        if !pattern.is_active {
            info!(pattern_id = %pattern.id, success_rate = pattern.success_rate, "pattern deactivated");
        }

        let outcome = LearningOutcome::Updated {
            pattern_id: pattern.id,
            created,
            is_active: pattern.is_active,
            success_rate: pattern.success_rate,
        };
        self.store.save(pattern)?;
        Ok(outcome)
    }

    fn required_correction<'e>(
        &self,
        event: &'e DecisionReviewedEvent,
    ) -> Result<&'e serde_json::Value, LearningError> {
        event
            .corrected_data
            .as_ref()
            .ok_or_else(|| LearningError::MissingCorrectedData(event.event_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use lojapet_core::{DecisionId, DecisionLogId, DecisionType, TenantId, UserId};

    #[derive(Default)]
    struct MapStore {
        patterns: RwLock<HashMap<PatternId, LearningPattern>>,
    }

    impl PatternStore for &MapStore {
        fn load_active(
            &self,
            tenant_id: TenantId,
            pattern_type: PatternType,
        ) -> Result<Vec<LearningPattern>, PatternStoreError> {
            Ok(self
                .patterns
                .read()
                .unwrap()
                .values()
                .filter(|p| {
                    p.tenant_id == tenant_id && p.pattern_type == pattern_type && p.is_active
                })
                .cloned()
                .collect())
        }

        fn save(&self, pattern: LearningPattern) -> Result<(), PatternStoreError> {
            self.patterns.write().unwrap().insert(pattern.id, pattern);
            Ok(())
        }
    }

    fn reviewed(
        tenant_id: TenantId,
        action: ReviewAction,
        corrected: Option<serde_json::Value>,
    ) -> DecisionReviewedEvent {
        DecisionReviewedEvent {
            event_id: Uuid::now_v7(),
            decision_id: DecisionId::new(),
            decision_log_id: DecisionLogId::new(),
            decision_type: DecisionType::CategorizeTransaction,
            tenant_id,
            reviewer_id: UserId::new(),
            action,
            original_decision: json!({"category": "alimentacao"}),
            confidence_score_original: 82,
            input_signature: "petz racao".to_string(),
            corrected_data: corrected,
            comment: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn approval_creates_then_reinforces_one_pattern() {
        let store = MapStore::default();
        let service = LearningService::new(&store);
        let tenant_id = TenantId::new();

        let first = service
            .process_review_event(&reviewed(tenant_id, ReviewAction::Approved, None))
            .unwrap();
        let LearningOutcome::Updated {
            pattern_id, created, ..
        } = first
        else {
            panic!("expected an update");
        };
        assert!(created);

        let second = service
            .process_review_event(&reviewed(tenant_id, ReviewAction::Approved, None))
            .unwrap();
        match second {
            LearningOutcome::Updated {
                pattern_id: second_id,
                created,
                success_rate,
                ..
            } => {
                assert_eq!(second_id, pattern_id, "same signature must hit the same pattern");
                assert!(!created);
                assert!(success_rate > 50.0);
            }
            other => panic!("expected an update, got {other:?}"),
        }
        assert_eq!(store.patterns.read().unwrap().len(), 1);
    }

    #[test]
    fn correction_overwrites_the_preference() {
        let store = MapStore::default();
        let service = LearningService::new(&store);
        let tenant_id = TenantId::new();

        service
            .process_review_event(&reviewed(tenant_id, ReviewAction::Approved, None))
            .unwrap();
        service
            .process_review_event(&reviewed(
                tenant_id,
                ReviewAction::Corrected,
                Some(json!({"category": "higiene"})),
            ))
            .unwrap();

        let patterns = store.patterns.read().unwrap();
        let pattern = patterns.values().next().unwrap();
        assert_eq!(pattern.output_preference, json!({"category": "higiene"}));
    }

    #[test]
    fn corrected_without_payload_is_a_loud_error() {
        let store = MapStore::default();
        let service = LearningService::new(&store);
        let err = service
            .process_review_event(&reviewed(TenantId::new(), ReviewAction::Corrected, None))
            .unwrap_err();
        assert!(matches!(err, LearningError::MissingCorrectedData(_)));
    }

    #[test]
    fn rejection_without_a_matching_pattern_learns_nothing() {
        let store = MapStore::default();
        let service = LearningService::new(&store);
        let outcome = service
            .process_review_event(&reviewed(TenantId::new(), ReviewAction::Rejected, None))
            .unwrap();
        assert_eq!(outcome, LearningOutcome::NothingToLearn);
        assert!(store.patterns.read().unwrap().is_empty());
    }

    #[test]
    fn tenants_do_not_share_patterns() {
        let store = MapStore::default();
        let service = LearningService::new(&store);
        service
            .process_review_event(&reviewed(TenantId::new(), ReviewAction::Approved, None))
            .unwrap();
        service
            .process_review_event(&reviewed(TenantId::new(), ReviewAction::Approved, None))
            .unwrap();
        assert_eq!(store.patterns.read().unwrap().len(), 2);
    }
}
