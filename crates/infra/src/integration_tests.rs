//! Integration tests for the assembled decision loop.
//!
//! Tests: decide → log → review → learning → decide again, plus the trust
//! and guardrail read side, all over the in-memory adapters.

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use serde_json::json;

    use lojapet_core::{DecisionType, TenantId, UserId};
    use lojapet_decision::{
        DecisionContext, DecisionData, DecisionLogStore, DecisionPolicy, EngineRegistry,
        MaturityLevel, Period, PolicyAction, PolicyConfig, RuleEngine, TransactionFlow,
    };
    use lojapet_events::{AlertSeverity, DecisionEvent, EventBus, ReviewAction};

    use crate::pipeline::DecisionPipeline;

    fn pipeline() -> DecisionPipeline {
        let registry = EngineRegistry::new().with_engine(Box::new(RuleEngine::with_default_rules()));
        let policy = DecisionPolicy::new(PolicyConfig::default().with_maturity(MaturityLevel::Mature));
        DecisionPipeline::new(registry, policy)
    }

    fn transaction(tenant_id: TenantId, description: &str) -> DecisionContext {
        DecisionContext::new(
            tenant_id,
            DecisionType::CategorizeTransaction,
            DecisionData::Transaction {
                description: description.to_string(),
                amount_cents: -25_000,
                flow: TransactionFlow::Outflow,
                account: None,
            },
        )
        .with_source("bank_reconciliation")
    }

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        condition()
    }

    #[test]
    fn approval_feedback_raises_confidence_on_the_next_decision() {
        let pipeline = pipeline();
        let runner = pipeline.spawn_learning();
        let tenant_id = TenantId::new();

        let first = pipeline.decide(&transaction(tenant_id, "pix para distribuidora racao premium"));
        assert_eq!(first.confidence_score, 90);
        assert_eq!(first.policy.as_ref().map(|p| p.action), Some(PolicyAction::Execute));
        assert!(!first.requires_human_review);

        let log_id = pipeline
            .store()
            .load_for_period(tenant_id, None, &Period::last_days(1))
            .unwrap()[0]
            .id;
        pipeline
            .review()
            .submit_review(log_id, UserId::new(), ReviewAction::Approved, None, None)
            .unwrap();

        assert!(
            wait_until(Duration::from_secs(2), || pipeline.store().pattern_count() == 1),
            "learning runner never created the pattern"
        );

        let second = pipeline.decide(&transaction(tenant_id, "pix para distribuidora racao premium"));
        assert_eq!(second.confidence_score, 95, "pattern boost missing");

        runner.shutdown();
    }

    #[test]
    fn uncertain_decisions_land_in_the_review_queue_and_verdicts_resolve_them() {
        let pipeline = pipeline();
        let tenant_id = TenantId::new();

        let result = pipeline.decide(&transaction(tenant_id, "lancamento avulso 8841"));
        assert_eq!(result.confidence_score, 20);
        assert!(result.requires_human_review);

        let pending = pipeline.review().pending(tenant_id).unwrap();
        assert_eq!(pending.len(), 1);

        pipeline
            .review()
            .submit_review(
                pending[0].decision_log_id,
                UserId::new(),
                ReviewAction::Corrected,
                Some(json!({"category": "despesas_gerais"})),
                None,
            )
            .unwrap();

        assert!(pipeline.review().pending(tenant_id).unwrap().is_empty());
        let log = pipeline.store().get(pending[0].decision_log_id).unwrap();
        assert!(log.reviewed);
    }

    #[test]
    fn tenants_never_see_each_other() {
        let pipeline = pipeline();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        pipeline.decide(&transaction(tenant_a, "lancamento avulso 100"));
        pipeline.decide(&transaction(tenant_b, "lancamento avulso 200"));

        assert_eq!(pipeline.review().pending(tenant_a).unwrap().len(), 1);
        assert_eq!(pipeline.review().pending(tenant_b).unwrap().len(), 1);
        let period = Period::last_days(1);
        assert_eq!(
            pipeline.store().load_for_period(tenant_a, None, &period).unwrap().len(),
            1
        );
    }

    #[test]
    fn applying_a_decision_stamps_the_log_and_announces_it() {
        let pipeline = pipeline();
        let tenant_id = TenantId::new();
        let subscription = pipeline.bus().subscribe();

        pipeline.decide(&transaction(tenant_id, "conta de energia cemig"));
        let log_id = pipeline
            .store()
            .load_for_period(tenant_id, None, &Period::last_days(1))
            .unwrap()[0]
            .id;

        pipeline.record_application(log_id, None, "posted to ledger").unwrap();

        let log = pipeline.store().get(log_id).unwrap();
        assert!(log.applied);

        match subscription.try_recv().unwrap() {
            DecisionEvent::Applied(event) => {
                assert_eq!(event.decision_log_id, log_id);
                assert!(event.applied_automatically);
                assert_eq!(event.application_result, "posted to ledger");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn sustained_rejections_trip_the_guardrails() {
        let pipeline = pipeline();
        let tenant_id = TenantId::new();
        let reviewer = UserId::new();

        for i in 0..25 {
            pipeline.decide(&transaction(tenant_id, &format!("lancamento avulso {i}")));
        }
        let logs = pipeline
            .store()
            .load_for_period(tenant_id, None, &Period::last_days(1))
            .unwrap();
        for log in &logs {
            pipeline
                .review()
                .submit_review(log.id, reviewer, ReviewAction::Rejected, None, None)
                .unwrap();
        }

        let alerts = pipeline
            .trust()
            .run_guardrails(tenant_id, None, Period::last_days(1))
            .unwrap();
        assert!(!alerts.is_empty());
        assert!(alerts
            .iter()
            .any(|a| a.guardrail_type == "approval_rate" && a.severity == AlertSeverity::Emergency));
        assert!(alerts.iter().any(|a| a.circuit_breaker_triggered));

        let report = pipeline.trust().report(tenant_id, None, Period::last_days(1)).unwrap();
        assert_eq!(report.maturity, MaturityLevel::Learning);
        assert!(!report.can_increase_automation);
        assert_eq!(report.suggested_min_confidence, 95);
    }
}
