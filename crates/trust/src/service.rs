//! Trust evaluation service: pulls the logs, computes the report, raises
//! guardrail alerts.

use thiserror::Error;
use tracing::{info, warn};

use lojapet_core::{DecisionType, TenantId};
use lojapet_decision::{DecisionLogStore, DecisionLogStoreError, Period};
use lojapet_events::{AiAlertEvent, DecisionEvent, EventBus};
use lojapet_review::{ReviewStore, ReviewStoreError};

use crate::guardrails::{GuardrailConfig, evaluate_guardrails};
use crate::metrics::AiPerformanceMetrics;
use crate::report::AiTrustReport;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrustError {
    #[error(transparent)]
    DecisionLog(#[from] DecisionLogStoreError),

    #[error(transparent)]
    Review(#[from] ReviewStoreError),
}

/// Read-only trust evaluator over the decision and feedback logs.
///
/// It never changes behavior itself: reports feed policy reconfiguration and
/// alerts go out on the bus for consumers to act on.
pub struct TrustService<L, R, B> {
    log_store: L,
    review_store: R,
    bus: B,
    guardrails: GuardrailConfig,
}

impl<L, R, B> TrustService<L, R, B>
where
    L: DecisionLogStore,
    R: ReviewStore,
    B: EventBus<DecisionEvent>,
{
    pub fn new(log_store: L, review_store: R, bus: B) -> Self {
        Self {
            log_store,
            review_store,
            bus,
            guardrails: GuardrailConfig::default(),
        }
    }

    pub fn with_guardrails(mut self, guardrails: GuardrailConfig) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub fn metrics(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: Period,
    ) -> Result<AiPerformanceMetrics, TrustError> {
        let decisions = self
            .log_store
            .load_for_period(tenant_id, decision_type, &period)?;
        let feedback = self
            .review_store
            .feedback_for_period(tenant_id, decision_type, &period)?;
        Ok(AiPerformanceMetrics::compute(
            tenant_id,
            decision_type,
            period,
            &decisions,
            &feedback,
        ))
    }

    pub fn report(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: Period,
    ) -> Result<AiTrustReport, TrustError> {
        Ok(AiTrustReport::from_metrics(self.metrics(
            tenant_id,
            decision_type,
            period,
        )?))
    }

    /// Evaluate the guardrails for a scope and publish one alert per breach.
    /// Returns the alerts so schedulers can also act on them directly.
    pub fn run_guardrails(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: Period,
    ) -> Result<Vec<AiAlertEvent>, TrustError> {
        let metrics = self.metrics(tenant_id, decision_type, period)?;
        let alerts = evaluate_guardrails(&metrics, &self.guardrails);

        for alert in &alerts {
            info!(
                %tenant_id,
                guardrail = %alert.guardrail_type,
                severity = ?alert.severity,
                value = alert.current_value,
                "guardrail breached"
            );
            if let Err(err) = self.bus.publish(DecisionEvent::Alert(alert.clone())) {
                warn!(%tenant_id, ?err, "alert publish failed; alert still returned");
            }
        }
        Ok(alerts)
    }
}
