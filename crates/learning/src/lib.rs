//! `lojapet-learning` — learned decision patterns and the feedback loop.
//!
//! A [`LearningPattern`] maps a normalized input fingerprint to the output a
//! tenant prefers for it. Patterns are **only** created and adjusted from
//! human review verdicts; the engines merely read them for confidence boosts.

pub mod pattern;
pub mod service;
pub mod signature;
pub mod store;

pub use pattern::LearningPattern;
pub use service::{LearningError, LearningOutcome, LearningService};
pub use signature::SimilarityConfig;
pub use store::{PatternStore, PatternStoreError};
