//! `lojapet-decision` — the AI decision core.
//!
//! Turns a [`DecisionContext`] into a scored, explained [`DecisionResult`]:
//! engines are tried in tier order, the confidence calculator aggregates
//! weighted signals, the policy maps score → action, and the orchestrator
//! persists an audit log row and routes uncertain decisions to review.
//!
//! This crate never decides business outcomes itself — it decides *how
//! confident to be* and *who gets to act on that confidence*.

pub mod confidence;
pub mod context;
pub mod engine;
pub mod orchestrator;
pub mod policy;
pub mod result;
pub mod rule_engine;
pub mod store;

pub use confidence::{
    CalculatorConfig, ConfidenceCalculator, ConfidenceError, ConfidenceInput, ConfidenceSource,
};
pub use context::{DecisionConstraints, DecisionContext, DecisionData, TransactionFlow};
pub use engine::{DecisionEngine, EngineError, EngineRegistry};
pub use orchestrator::{Orchestrator, ReviewQueue, ReviewQueueError, ReviewRequest};
pub use policy::{AuditLevel, DecisionPolicy, MaturityLevel, PolicyAction, PolicyConfig, PolicyDecision};
pub use result::{Alternative, ConfidenceLevel, DecisionPayload, DecisionResult, Evidence};
pub use rule_engine::{KeywordRule, RuleEngine};
pub use store::{DecisionLog, DecisionLogStore, DecisionLogStoreError, Period};
