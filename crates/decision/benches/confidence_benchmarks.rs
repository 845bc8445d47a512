use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lojapet_core::{DecisionType, TenantId};
use lojapet_decision::{
    ConfidenceCalculator, ConfidenceInput, ConfidenceSource, DecisionContext, DecisionData,
    DecisionEngine, RuleEngine, TransactionFlow,
};
use lojapet_learning::signature::{build_signature, SimilarityConfig};

fn sample_inputs(count: usize) -> Vec<ConfidenceInput> {
    (0..count)
        .map(|i| {
            let source = match i % 3 {
                0 => ConfidenceSource::RuleBased,
                1 => ConfidenceSource::PatternLearned,
                _ => ConfidenceSource::HistoricalAccuracy,
            };
            ConfidenceInput::new(source, 70 + (i % 25) as u8, 0.2 + (i % 4) as f64 * 0.2, "bench")
        })
        .collect()
}

fn bench_confidence_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("confidence_calculation");
    group.sample_size(1000);

    for input_count in [1, 3, 7].iter() {
        group.throughput(Throughput::Elements(*input_count as u64));
        group.bench_with_input(
            BenchmarkId::new("weighted_mean", input_count),
            input_count,
            |b, &count| {
                let calculator = ConfidenceCalculator::default();
                let inputs = sample_inputs(count);
                b.iter(|| {
                    black_box(
                        calculator
                            .calculate(DecisionType::CategorizeTransaction, black_box(&inputs))
                            .unwrap(),
                    );
                });
            },
        );
    }

    group.finish();
}

fn bench_rule_engine_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_engine_decide");
    group.sample_size(1000);

    let engine = RuleEngine::with_default_rules();
    let tenant_id = TenantId::new();

    group.bench_function("matching_transaction", |b| {
        let context = DecisionContext::new(
            tenant_id,
            DecisionType::CategorizeTransaction,
            DecisionData::Transaction {
                description: "pix fornecedor racao premium caes".to_string(),
                amount_cents: -45000,
                flow: TransactionFlow::Outflow,
                account: None,
            },
        );
        b.iter(|| {
            black_box(engine.decide(black_box(&context), &[]).unwrap());
        });
    });

    group.bench_function("unmatched_transaction", |b| {
        let context = DecisionContext::new(
            tenant_id,
            DecisionType::CategorizeTransaction,
            DecisionData::Transaction {
                description: "xyzw qqqq zzzz".to_string(),
                amount_cents: -100,
                flow: TransactionFlow::Outflow,
                account: None,
            },
        );
        b.iter(|| {
            black_box(engine.decide(black_box(&context), &[]).unwrap());
        });
    });

    group.finish();
}

fn bench_signature_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature_build");
    group.sample_size(1000);

    let config = SimilarityConfig::default();
    let short = "pix petz racao";
    let long = "pagamento boleto fornecedor de racao premium para caes e gatos \
                referente ao pedido 4821 com desconto aplicado na loja matriz";

    group.bench_with_input(BenchmarkId::new("normalize_and_build", "short"), &short, |b, text| {
        b.iter(|| black_box(build_signature(black_box(text), &config)));
    });
    group.bench_with_input(BenchmarkId::new("normalize_and_build", "long"), &long, |b, text| {
        b.iter(|| black_box(build_signature(black_box(text), &config)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_confidence_calculation,
    bench_rule_engine_decide,
    bench_signature_build
);
criterion_main!(benches);
