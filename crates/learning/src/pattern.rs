//! Learned input→preferred-output patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lojapet_core::{PatternId, PatternType, TenantId};

use crate::signature::{SimilarityConfig, coarse_category, combined_similarity, extract_keywords};

/// Confidence boost a freshly-created pattern starts with.
pub const INITIAL_BOOST: u8 = 10;
/// Upper clamp for reinforced boosts.
pub const MAX_BOOST: u8 = 30;
/// Lower clamp for corrected boosts (rejections may push below, to 0).
pub const MIN_BOOST_CORRECTED: u8 = 5;
/// Neutral success-rate prior; counted as one observation in the running
/// average so early feedback moves the rate without saturating it.
pub const SEED_SUCCESS_RATE: f64 = 50.0;

/// A persisted input→preferred-output mapping, reinforced or decayed by
/// human feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPattern {
    pub id: PatternId,
    pub tenant_id: TenantId,
    pub pattern_type: PatternType,
    /// Normalized feature fingerprint (sorted keywords) of the request.
    pub input_signature: String,
    /// Decision payload this signature should map to.
    pub output_preference: JsonValue,
    /// Extra confidence an engine may claim when this pattern matches (0-30).
    pub confidence_boost: u8,
    /// Number of review verdicts folded into this pattern.
    pub occurrences: u32,
    /// Running average of review outcomes, 0-100.
    pub success_rate: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl LearningPattern {
    pub fn new(
        tenant_id: TenantId,
        pattern_type: PatternType,
        input_signature: impl Into<String>,
        output_preference: JsonValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PatternId::new(),
            tenant_id,
            pattern_type,
            input_signature: input_signature.into(),
            output_preference,
            confidence_boost: INITIAL_BOOST,
            occurrences: 0,
            success_rate: SEED_SUCCESS_RATE,
            is_active: true,
            created_at: now,
            last_used_at: now,
        }
    }

    /// Fold one review outcome (0 or 100) into the running success average.
    ///
    /// The seed rate counts as one observation, so after `n` verdicts the
    /// divisor is `n + 1`. Approvals therefore approach 100 asymptotically
    /// and never reach it.
    fn fold_outcome(&mut self, outcome: f64, now: DateTime<Utc>) {
        self.occurrences += 1;
        self.success_rate += (outcome - self.success_rate) / (self.occurrences as f64 + 1.0);
        self.last_used_at = now;
    }

    /// Reviewer confirmed the engine's output for this signature.
    pub fn record_approval(&mut self, now: DateTime<Utc>) {
        self.fold_outcome(100.0, now);
        self.confidence_boost = (self.confidence_boost + 3).min(MAX_BOOST);
    }

    /// Reviewer replaced the output; the corrected payload becomes the new
    /// preference.
    pub fn record_correction(&mut self, corrected: JsonValue, now: DateTime<Utc>) {
        self.fold_outcome(0.0, now);
        self.output_preference = corrected;
        self.confidence_boost = self.confidence_boost.saturating_sub(5).max(MIN_BOOST_CORRECTED);
        if self.success_rate < 50.0 && self.occurrences > 5 {
            self.is_active = false;
        }
    }

    /// Reviewer rejected the output with no correction. Nothing is learned
    /// about the right answer, so the pattern only decays.
    pub fn record_rejection(&mut self, now: DateTime<Utc>) {
        self.fold_outcome(0.0, now);
        self.confidence_boost = self.confidence_boost.saturating_sub(10);
        if self.success_rate < 40.0 || self.confidence_boost < MIN_BOOST_CORRECTED {
            self.is_active = false;
        }
    }

    /// Similarity between this pattern and a candidate request.
    pub fn similarity_to(
        &self,
        signature: &str,
        category: Option<&str>,
        config: &SimilarityConfig,
    ) -> f64 {
        let own = extract_keywords(&self.input_signature, config);
        let other = extract_keywords(signature, config);
        combined_similarity(
            &own,
            coarse_category(&self.output_preference),
            &other,
            category,
            config,
        )
    }
}

/// Pick the best-matching active pattern for a request signature, if any
/// clears the same-pattern threshold.
pub fn best_match<'a>(
    patterns: &'a [LearningPattern],
    signature: &str,
    category: Option<&str>,
    config: &SimilarityConfig,
) -> Option<(&'a LearningPattern, f64)> {
    patterns
        .iter()
        .filter(|p| p.is_active)
        .map(|p| (p, p.similarity_to(signature, category, config)))
        .filter(|(_, sim)| *sim >= config.same_pattern_threshold)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn test_pattern() -> LearningPattern {
        LearningPattern::new(
            TenantId::new(),
            PatternType::TransactionCategory,
            "petz racao",
            json!({"category": "alimentacao"}),
            Utc::now(),
        )
    }

    #[test]
    fn approvals_strictly_increase_success_rate_toward_100() {
        let mut pattern = test_pattern();
        let mut last = pattern.success_rate;
        for _ in 0..50 {
            pattern.record_approval(Utc::now());
            assert!(pattern.success_rate > last);
            assert!(pattern.success_rate < 100.0);
            last = pattern.success_rate;
        }
        assert!(pattern.success_rate > 95.0);
        assert_eq!(pattern.confidence_boost, MAX_BOOST);
        assert!(pattern.is_active);
    }

    #[test]
    fn six_consecutive_corrections_deactivate() {
        let mut pattern = test_pattern();
        for i in 0..6 {
            assert!(pattern.is_active, "still active after {i} corrections");
            pattern.record_correction(json!({"category": "higiene"}), Utc::now());
        }
        assert!(!pattern.is_active);
        assert_eq!(pattern.occurrences, 6);
        assert_eq!(pattern.output_preference, json!({"category": "higiene"}));
    }

    #[test]
    fn correction_floors_boost_at_5() {
        let mut pattern = test_pattern();
        for _ in 0..4 {
            pattern.record_correction(json!({"category": "x"}), Utc::now());
        }
        assert_eq!(pattern.confidence_boost, MIN_BOOST_CORRECTED);
    }

    #[test]
    fn one_rejection_on_a_fresh_pattern_deactivates_it() {
        // Fresh boost is 10; a rejection drops it to 0, below the floor.
        let mut pattern = test_pattern();
        pattern.record_rejection(Utc::now());
        assert_eq!(pattern.confidence_boost, 0);
        assert!(!pattern.is_active);
    }

    #[test]
    fn a_well_established_pattern_survives_one_rejection() {
        let mut pattern = test_pattern();
        for _ in 0..10 {
            pattern.record_approval(Utc::now());
        }
        pattern.record_rejection(Utc::now());
        assert_eq!(pattern.confidence_boost, 20);
        assert!(pattern.is_active);
    }

    #[test]
    fn best_match_skips_inactive_patterns() {
        let config = SimilarityConfig::default();
        let mut inactive = test_pattern();
        inactive.is_active = false;
        let patterns = vec![inactive];
        assert!(best_match(&patterns, "petz racao", Some("alimentacao"), &config).is_none());
    }

    #[test]
    fn best_match_requires_threshold() {
        let config = SimilarityConfig::default();
        let patterns = vec![test_pattern()];
        // Same category but unrelated keywords: 0.3 < 0.7 threshold.
        assert!(best_match(&patterns, "consulta veterinaria", Some("alimentacao"), &config).is_none());
        let hit = best_match(&patterns, "racao petz", Some("alimentacao"), &config);
        assert!(hit.is_some());
    }

    fn arb_verdicts() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..3, 1..60)
    }

    proptest! {
        #[test]
        fn any_verdict_sequence_keeps_the_pattern_within_bounds(verdicts in arb_verdicts()) {
            let mut pattern = test_pattern();
            for verdict in verdicts {
                match verdict {
                    0 => pattern.record_approval(Utc::now()),
                    1 => pattern.record_correction(json!({"category": "x"}), Utc::now()),
                    _ => pattern.record_rejection(Utc::now()),
                }
                prop_assert!((0.0..=100.0).contains(&pattern.success_rate));
                prop_assert!(pattern.confidence_boost <= MAX_BOOST);
            }
        }

        #[test]
        fn approvals_converge_toward_100_from_any_prior_history(
            corrections in 0u32..5,
            approvals in 10u32..80,
        ) {
            let mut pattern = test_pattern();
            for _ in 0..corrections {
                pattern.record_correction(json!({"category": "x"}), Utc::now());
            }
            let mut last = pattern.success_rate;
            for _ in 0..approvals {
                pattern.record_approval(Utc::now());
                prop_assert!(pattern.success_rate > last);
                prop_assert!(pattern.success_rate < 100.0);
                last = pattern.success_rate;
            }
        }
    }
}
