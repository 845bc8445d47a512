//! Metric guardrails: turn bad trends into alerts before they become damage.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lojapet_events::{AiAlertEvent, AlertSeverity};

use crate::metrics::AiPerformanceMetrics;

/// Escalating breach bands for one metric. `warning` is the least severe
/// band; a value past `emergency` trips the circuit breaker.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailBands {
    pub warning: f64,
    pub critical: f64,
    pub emergency: f64,
}

/// Guardrail thresholds. Floors alert when the metric drops below a band,
/// ceilings when it rises above one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Reviewed verdicts required before any guardrail fires; tiny samples
    /// produce noise, not signal.
    pub min_sample_size: u64,
    pub approval_rate_floor: GuardrailBands,
    pub rejection_rate_ceiling: GuardrailBands,
    pub correction_rate_ceiling: GuardrailBands,
    pub confidence_gap_ceiling: GuardrailBands,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 20,
            approval_rate_floor: GuardrailBands {
                warning: 70.0,
                critical: 55.0,
                emergency: 40.0,
            },
            rejection_rate_ceiling: GuardrailBands {
                warning: 15.0,
                critical: 25.0,
                emergency: 40.0,
            },
            correction_rate_ceiling: GuardrailBands {
                warning: 20.0,
                critical: 35.0,
                emergency: 50.0,
            },
            confidence_gap_ceiling: GuardrailBands {
                warning: 20.0,
                critical: 30.0,
                emergency: 40.0,
            },
        }
    }
}

fn floor_breach(value: f64, bands: &GuardrailBands) -> Option<(AlertSeverity, f64)> {
    if value < bands.emergency {
        Some((AlertSeverity::Emergency, bands.emergency))
    } else if value < bands.critical {
        Some((AlertSeverity::Critical, bands.critical))
    } else if value < bands.warning {
        Some((AlertSeverity::Warning, bands.warning))
    } else {
        None
    }
}

fn ceiling_breach(value: f64, bands: &GuardrailBands) -> Option<(AlertSeverity, f64)> {
    if value > bands.emergency {
        Some((AlertSeverity::Emergency, bands.emergency))
    } else if value > bands.critical {
        Some((AlertSeverity::Critical, bands.critical))
    } else if value > bands.warning {
        Some((AlertSeverity::Warning, bands.warning))
    } else {
        None
    }
}

fn recommended_action(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Warning => "watch the scope and review recent corrections",
        AlertSeverity::Critical => "lower automation: raise the minimum confidence for the scope",
        AlertSeverity::Emergency => "force review-only mode for the scope until rates recover",
    }
}

/// Check one metrics snapshot against the guardrails.
///
/// Returns one alert per breached metric, each at the most severe band it
/// crossed. `circuit_breaker_triggered` is set only on `Emergency` alerts.
pub fn evaluate_guardrails(
    metrics: &AiPerformanceMetrics,
    config: &GuardrailConfig,
) -> Vec<AiAlertEvent> {
    if metrics.reviewed_decisions < config.min_sample_size {
        return Vec::new();
    }

    let snapshot = serde_json::to_value(metrics).unwrap_or(JsonValue::Null);
    let checks = [
        (
            "approval_rate",
            metrics.approval_rate,
            floor_breach(metrics.approval_rate, &config.approval_rate_floor),
        ),
        (
            "rejection_rate",
            metrics.rejection_rate,
            ceiling_breach(metrics.rejection_rate, &config.rejection_rate_ceiling),
        ),
        (
            "correction_rate",
            metrics.correction_rate,
            ceiling_breach(metrics.correction_rate, &config.correction_rate_ceiling),
        ),
        (
            "confidence_gap",
            metrics.confidence_gap(),
            ceiling_breach(metrics.confidence_gap(), &config.confidence_gap_ceiling),
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(guardrail, value, breach)| {
            breach.map(|(severity, threshold)| AiAlertEvent {
                severity,
                tenant_id: metrics.tenant_id,
                decision_type: metrics.decision_type,
                guardrail_type: guardrail.to_string(),
                current_value: value,
                threshold_violated: threshold,
                metrics_snapshot: snapshot.clone(),
                recommended_action: recommended_action(severity).to_string(),
                circuit_breaker_triggered: severity == AlertSeverity::Emergency,
                occurred_at: Utc::now(),
            })
        })
        .collect()
}
