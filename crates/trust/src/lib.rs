//! `lojapet-trust` — earned-autonomy accounting for the decision core.
//!
//! Computes performance metrics from the decision and feedback logs, derives
//! a trust report (maturity, composite score, suggested thresholds) and
//! raises guardrail alerts when quality degrades.

pub mod guardrails;
pub mod metrics;
pub mod report;
pub mod service;

pub use guardrails::{GuardrailBands, GuardrailConfig, evaluate_guardrails};
pub use metrics::AiPerformanceMetrics;
pub use report::{AiTrustReport, EstimateConfidence};
pub use service::{TrustError, TrustService};
