//! Persistence seam for learning patterns.
//!
//! The decision core does not own pattern storage; implementations live in
//! the infrastructure layer (in-memory for tests/dev, SQL in production).

use thiserror::Error;

use lojapet_core::{PatternType, TenantId};

use crate::pattern::LearningPattern;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternStoreError {
    /// The store is unreachable or an internal lock was poisoned.
    #[error("pattern store unavailable: {0}")]
    Unavailable(String),

    /// A stored pattern could not be decoded.
    #[error("corrupted pattern record: {0}")]
    Corrupted(String),
}

/// Tenant-scoped pattern storage.
///
/// `load_active` returns only `is_active` patterns; deactivated ones stay in
/// the store for audit but never influence decisions again.
pub trait PatternStore: Send + Sync {
    fn load_active(
        &self,
        tenant_id: TenantId,
        pattern_type: PatternType,
    ) -> Result<Vec<LearningPattern>, PatternStoreError>;

    /// Insert or update by pattern id.
    fn save(&self, pattern: LearningPattern) -> Result<(), PatternStoreError>;
}

impl<T> PatternStore for std::sync::Arc<T>
where
    T: PatternStore + ?Sized,
{
    fn load_active(
        &self,
        tenant_id: TenantId,
        pattern_type: PatternType,
    ) -> Result<Vec<LearningPattern>, PatternStoreError> {
        (**self).load_active(tenant_id, pattern_type)
    }

    fn save(&self, pattern: LearningPattern) -> Result<(), PatternStoreError> {
        (**self).save(pattern)
    }
}
