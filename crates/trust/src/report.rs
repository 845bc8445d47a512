//! Trust report: how much autonomy the decision core has earned in a scope.

use serde::{Deserialize, Serialize};

use lojapet_decision::MaturityLevel;

use crate::metrics::AiPerformanceMetrics;

/// Reviewed sample sizes below this make the estimate unreliable.
const LOW_SAMPLE: u64 = 30;
/// Reviewed sample sizes below this make the estimate indicative only.
const MEDIUM_SAMPLE: u64 = 100;
/// Reviewed verdicts needed before automation may be widened.
const MIN_SAMPLE_FOR_AUTOMATION: u64 = 50;

/// How much the report itself can be trusted, keyed on sample size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateConfidence {
    Low,
    Medium,
    High,
}

impl EstimateConfidence {
    fn from_sample(reviewed: u64) -> Self {
        match reviewed {
            n if n < LOW_SAMPLE => EstimateConfidence::Low,
            n if n < MEDIUM_SAMPLE => EstimateConfidence::Medium,
            _ => EstimateConfidence::High,
        }
    }
}

/// Derived trust assessment for one scope.
///
/// Consumed by operators (dashboard) and by policy configuration: the
/// suggested threshold feeds `PolicyConfig` on the next re-evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTrustReport {
    pub metrics: AiPerformanceMetrics,
    pub maturity: MaturityLevel,
    /// Composite 0-100 score blending approval, automation, calibration,
    /// rejection and volume.
    pub trust_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub suggested_min_confidence: u8,
    pub suggested_review_threshold: u8,
    pub can_increase_automation: bool,
    pub estimate_confidence: EstimateConfidence,
}

impl AiTrustReport {
    /// Derive the report from a metrics snapshot.
    ///
    /// A scope with no decisions yet gets the canonical cold-start report:
    /// `Learning`, trust score 0, min confidence 95, review threshold 100
    /// (everything goes to a human), automation locked.
    pub fn from_metrics(metrics: AiPerformanceMetrics) -> Self {
        if !metrics.has_data() {
            return Self {
                maturity: MaturityLevel::Learning,
                trust_score: 0.0,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                risks: Vec::new(),
                recommendations: vec![
                    "no decision history yet; keep every decision under human review".to_string(),
                ],
                suggested_min_confidence: 95,
                suggested_review_threshold: 100,
                can_increase_automation: false,
                estimate_confidence: EstimateConfidence::Low,
                metrics,
            };
        }

        let maturity = Self::maturity_for(metrics.approval_rate);
        let trust_score = Self::trust_score(&metrics);
        let suggested_min_confidence = Self::suggested_min_confidence(maturity, &metrics);
        let suggested_review_threshold = Self::suggested_review_threshold(maturity);
        let can_increase_automation = Self::can_increase_automation(maturity, &metrics);
        let estimate_confidence = EstimateConfidence::from_sample(metrics.reviewed_decisions);
        let (strengths, weaknesses, risks) = Self::assess(&metrics);
        let recommendations =
            Self::recommend(&metrics, can_increase_automation, suggested_min_confidence);

        Self {
            metrics,
            maturity,
            trust_score,
            strengths,
            weaknesses,
            risks,
            recommendations,
            suggested_min_confidence,
            suggested_review_threshold,
            can_increase_automation,
            estimate_confidence,
        }
    }

    fn maturity_for(approval_rate: f64) -> MaturityLevel {
        match approval_rate {
            r if r < 50.0 => MaturityLevel::Learning,
            r if r < 70.0 => MaturityLevel::Developing,
            r if r < 85.0 => MaturityLevel::Reliable,
            r if r < 95.0 => MaturityLevel::Mature,
            _ => MaturityLevel::Expert,
        }
    }

    fn trust_score(metrics: &AiPerformanceMetrics) -> f64 {
        let gap = metrics.confidence_gap();
        let calibration = (100.0 - 5.0 * gap).max(0.0);
        let rejection = (100.0 - 10.0 * metrics.rejection_rate).max(0.0);
        let volume = f64::from(Self::volume_bucket(metrics.reviewed_decisions)) * 10.0;

        let score = 0.4 * metrics.approval_rate
            + 0.2 * metrics.automation_rate
            + 0.2 * calibration
            + 0.1 * rejection
            + 0.1 * volume;
        score.clamp(0.0, 100.0)
    }

    fn volume_bucket(reviewed: u64) -> u8 {
        match reviewed {
            n if n < 10 => 2,
            n if n < 50 => 5,
            n if n < 100 => 7,
            _ => 10,
        }
    }

    fn suggested_min_confidence(maturity: MaturityLevel, metrics: &AiPerformanceMetrics) -> u8 {
        let base: u8 = match maturity {
            MaturityLevel::Learning => 95,
            MaturityLevel::Developing => 90,
            MaturityLevel::Reliable => 85,
            MaturityLevel::Mature => 80,
            MaturityLevel::Expert => 75,
        };
        let penalized = if metrics.confidence_gap() > 20.0 || metrics.rejection_rate > 10.0 {
            base + 5
        } else {
            base
        };
        penalized.min(95)
    }

    fn suggested_review_threshold(maturity: MaturityLevel) -> u8 {
        match maturity {
            MaturityLevel::Learning => 75,
            MaturityLevel::Developing => 70,
            MaturityLevel::Reliable => 60,
            MaturityLevel::Mature => 55,
            MaturityLevel::Expert => 50,
        }
    }

    fn assess(metrics: &AiPerformanceMetrics) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        let mut risks = Vec::new();
        let gap = metrics.confidence_gap();

        if metrics.approval_rate >= 85.0 {
            strengths.push(format!(
                "reviewers approve {:.0}% of decisions as-is",
                metrics.approval_rate
            ));
        } else if metrics.approval_rate < 70.0 {
            weaknesses.push(format!(
                "approval rate is only {:.0}%",
                metrics.approval_rate
            ));
        }

        if gap < 10.0 {
            strengths.push("confidence scores track real outcomes closely".to_string());
        } else if gap > 20.0 {
            weaknesses.push(format!(
                "confidence is miscalibrated by {gap:.0} points against outcomes"
            ));
            if metrics.automation_rate > 25.0 {
                risks.push(
                    "a meaningful share of decisions executes on miscalibrated confidence"
                        .to_string(),
                );
            }
        }

        if metrics.correction_rate > 20.0 {
            weaknesses.push(format!(
                "{:.0}% of reviewed decisions needed correction",
                metrics.correction_rate
            ));
        }
        if metrics.rejection_rate > 10.0 {
            risks.push(format!(
                "rejection rate of {:.0}% erodes reviewer trust",
                metrics.rejection_rate
            ));
        }
        if metrics.reviewed_decisions >= 100 {
            strengths.push("large reviewed sample backs these numbers".to_string());
        }

        (strengths, weaknesses, risks)
    }

    fn recommend(
        metrics: &AiPerformanceMetrics,
        can_increase_automation: bool,
        suggested_min_confidence: u8,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();
        if can_increase_automation {
            recommendations.push(format!(
                "lower the execute threshold toward {suggested_min_confidence} to automate more"
            ));
        } else {
            recommendations.push(format!(
                "keep the minimum confidence at {suggested_min_confidence} or above"
            ));
        }
        if metrics.confidence_gap() > 20.0 {
            recommendations
                .push("re-tune confidence weights before widening automation".to_string());
        }
        if metrics.reviewed_decisions < 30 {
            recommendations
                .push("collect more review verdicts before trusting these rates".to_string());
        }
        recommendations
    }

    fn can_increase_automation(maturity: MaturityLevel, metrics: &AiPerformanceMetrics) -> bool {
        maturity >= MaturityLevel::Reliable
            && metrics.approval_rate >= 75.0
            && metrics.rejection_rate < 10.0
            && metrics.confidence_gap() < 15.0
            && metrics.reviewed_decisions >= MIN_SAMPLE_FOR_AUTOMATION
    }
}
