//! `lojapet-infra` — adapters and wiring for the decision core.
//!
//! In-memory implementations of the persistence seams plus the
//! [`DecisionPipeline`] that assembles orchestrator, review, learning and
//! trust over a shared store and event bus.

pub mod in_memory_store;
mod integration_tests;
pub mod pipeline;

pub use in_memory_store::InMemoryDecisionStore;
pub use pipeline::{
    DecisionPipeline, LearningRunner, LearningRunnerHandle, PipelineError, SharedBus, SharedStore,
};
