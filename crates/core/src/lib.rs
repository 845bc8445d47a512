//! `lojapet-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the closed set of automated decision kinds, and
//! the shared domain error model.

pub mod error;
pub mod id;
pub mod kind;

pub use error::{DomainError, DomainResult};
pub use id::{DecisionId, DecisionLogId, PatternId, ReviewId, TenantId, UserId};
pub use kind::{DecisionType, PatternType};
