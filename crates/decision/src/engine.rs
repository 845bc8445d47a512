//! Decision engine capability interface and tier-ordered registry.

use thiserror::Error;

use lojapet_core::DecisionType;
use lojapet_learning::LearningPattern;

use crate::context::DecisionContext;
use crate::result::DecisionResult;

/// One engine attempt failed. Never fatal to the overall request: the
/// orchestrator logs it and tries the next tier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine cannot work with this input shape.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The engine ran but could not produce a result.
    #[error("inference failed: {0}")]
    Failed(String),

    /// A dependency of the engine (model endpoint, lookup table) is down.
    #[error("engine dependency unavailable: {0}")]
    Unavailable(String),
}

/// Any strategy that turns a context into a scored result.
///
/// Engines are ranked by `tier` (lower = cheaper/faster, tried first) and
/// selected at runtime through [`EngineRegistry`] — explicit registration,
/// no inheritance, no global factories.
pub trait DecisionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Priority rank; lower tiers are tried first.
    fn tier(&self) -> u8;

    fn can_handle(&self, decision_type: DecisionType) -> bool;

    /// Produce a scored result. Active learning patterns for the tenant are
    /// passed in; engines must not do their own pattern lookups.
    fn decide(
        &self,
        context: &DecisionContext,
        patterns: &[LearningPattern],
    ) -> Result<DecisionResult, EngineError>;
}

/// Tier-ordered engine registry.
#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Box<dyn DecisionEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine, keeping the registry sorted ascending by tier.
    /// Registration order breaks ties (stable sort).
    pub fn register(&mut self, engine: Box<dyn DecisionEngine>) {
        self.engines.push(engine);
        self.engines.sort_by_key(|e| e.tier());
    }

    pub fn with_engine(mut self, engine: Box<dyn DecisionEngine>) -> Self {
        self.register(engine);
        self
    }

    pub fn engines(&self) -> &[Box<dyn DecisionEngine>] {
        &self.engines
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl core::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<(&str, u8)> = self.engines.iter().map(|e| (e.name(), e.tier())).collect();
        f.debug_struct("EngineRegistry").field("engines", &names).finish()
    }
}
