//! In-memory store backing all persistence seams for tests/dev.
//!
//! One struct implements the pattern, decision-log and review stores so a
//! single `Arc` can be handed to every service. Poisoned locks surface as
//! `Unavailable`; the decision and feedback logs are append-only.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use lojapet_core::{DecisionLogId, DecisionType, PatternId, PatternType, TenantId, UserId};
use lojapet_decision::{
    DecisionLog, DecisionLogStore, DecisionLogStoreError, Period,
};
use lojapet_learning::{LearningPattern, PatternStore, PatternStoreError};
use lojapet_review::{FeedbackLog, PendingReview, ReviewStatus, ReviewStore, ReviewStoreError};

#[derive(Debug, Default)]
pub struct InMemoryDecisionStore {
    patterns: RwLock<HashMap<PatternId, LearningPattern>>,
    logs: RwLock<Vec<DecisionLog>>,
    reviews: RwLock<Vec<PendingReview>>,
    feedback: RwLock<Vec<FeedbackLog>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision_count(&self) -> usize {
        self.logs.read().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.read().map(|p| p.len()).unwrap_or(0)
    }
}

impl PatternStore for InMemoryDecisionStore {
    fn load_active(
        &self,
        tenant_id: TenantId,
        pattern_type: PatternType,
    ) -> Result<Vec<LearningPattern>, PatternStoreError> {
        let patterns = self
            .patterns
            .read()
            .map_err(|e| PatternStoreError::Unavailable(e.to_string()))?;
        Ok(patterns
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.pattern_type == pattern_type && p.is_active)
            .cloned()
            .collect())
    }

    fn save(&self, pattern: LearningPattern) -> Result<(), PatternStoreError> {
        let mut patterns = self
            .patterns
            .write()
            .map_err(|e| PatternStoreError::Unavailable(e.to_string()))?;
        patterns.insert(pattern.id, pattern);
        Ok(())
    }
}

impl DecisionLogStore for InMemoryDecisionStore {
    fn save(&self, log: DecisionLog) -> Result<DecisionLogId, DecisionLogStoreError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|e| DecisionLogStoreError::Unavailable(e.to_string()))?;
        let id = log.id;
        logs.push(log);
        Ok(id)
    }

    fn get(&self, id: DecisionLogId) -> Result<DecisionLog, DecisionLogStoreError> {
        let logs = self
            .logs
            .read()
            .map_err(|e| DecisionLogStoreError::Unavailable(e.to_string()))?;
        logs.iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(DecisionLogStoreError::NotFound(id))
    }

    fn mark_reviewed(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|e| DecisionLogStoreError::Unavailable(e.to_string()))?;
        let log = logs
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DecisionLogStoreError::NotFound(id))?;
        log.reviewed = true;
        log.reviewed_at = Some(at);
        Ok(())
    }

    fn mark_applied(
        &self,
        id: DecisionLogId,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionLogStoreError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|e| DecisionLogStoreError::Unavailable(e.to_string()))?;
        let log = logs
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DecisionLogStoreError::NotFound(id))?;
        log.applied = true;
        log.applied_at = Some(at);
        Ok(())
    }

    fn load_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<DecisionLog>, DecisionLogStoreError> {
        let logs = self
            .logs
            .read()
            .map_err(|e| DecisionLogStoreError::Unavailable(e.to_string()))?;
        Ok(logs
            .iter()
            .filter(|l| l.tenant_id == tenant_id)
            .filter(|l| decision_type.is_none_or(|t| l.decision_type == t))
            .filter(|l| period.contains(l.created_at))
            .cloned()
            .collect())
    }
}

impl ReviewStore for InMemoryDecisionStore {
    fn enqueue(&self, entry: PendingReview) -> Result<(), ReviewStoreError> {
        let mut reviews = self
            .reviews
            .write()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        reviews.push(entry);
        Ok(())
    }

    fn find_by_decision_log(
        &self,
        decision_log_id: DecisionLogId,
    ) -> Result<Option<PendingReview>, ReviewStoreError> {
        let reviews = self
            .reviews
            .read()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        Ok(reviews
            .iter()
            .find(|e| e.decision_log_id == decision_log_id)
            .cloned())
    }

    fn resolve(
        &self,
        decision_log_id: DecisionLogId,
        status: ReviewStatus,
        resolved_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        let mut reviews = self
            .reviews
            .write()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        let entry = reviews
            .iter_mut()
            .find(|e| e.decision_log_id == decision_log_id)
            .ok_or(ReviewStoreError::NotFound(decision_log_id))?;
        entry.status = status;
        entry.resolved_by = Some(resolved_by);
        entry.resolved_at = Some(at);
        Ok(())
    }

    fn list_pending(&self, tenant_id: TenantId) -> Result<Vec<PendingReview>, ReviewStoreError> {
        let reviews = self
            .reviews
            .read()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        Ok(reviews
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.status == ReviewStatus::Pending)
            .cloned()
            .collect())
    }

    fn append_feedback(&self, feedback: FeedbackLog) -> Result<(), ReviewStoreError> {
        let mut rows = self
            .feedback
            .write()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        rows.push(feedback);
        Ok(())
    }

    fn feedback_for_period(
        &self,
        tenant_id: TenantId,
        decision_type: Option<DecisionType>,
        period: &Period,
    ) -> Result<Vec<FeedbackLog>, ReviewStoreError> {
        let rows = self
            .feedback
            .read()
            .map_err(|e| ReviewStoreError::Unavailable(e.to_string()))?;
        Ok(rows
            .iter()
            .filter(|f| f.tenant_id == tenant_id)
            .filter(|f| decision_type.is_none_or(|t| f.decision_type == t))
            .filter(|f| period.contains(f.created_at))
            .cloned()
            .collect())
    }
}
