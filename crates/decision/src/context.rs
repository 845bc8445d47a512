//! Immutable description of one decision request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lojapet_core::{DecisionId, DecisionType, TenantId};

/// Default confidence an engine result must reach before the orchestrator
/// stops escalating to later tiers.
pub const DEFAULT_MIN_CONFIDENCE: u8 = 80;

/// Direction of money movement for a transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFlow {
    Inflow,
    Outflow,
}

/// Typed payload of a decision request, one shape per decision type.
///
/// `Generic` is the escape hatch for callers experimenting with new inputs;
/// engines that need structure should reject it as unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionData {
    Transaction {
        description: String,
        amount_cents: i64,
        flow: TransactionFlow,
        account: Option<String>,
    },
    Sale {
        customer_ref: Option<String>,
        recent_products: Vec<String>,
    },
    Payment {
        payer: String,
        amount_cents: i64,
        open_invoice_refs: Vec<String>,
    },
    Generic(JsonValue),
}

impl DecisionData {
    /// Free text used to fingerprint this request for pattern matching.
    pub fn signature_text(&self) -> String {
        match self {
            DecisionData::Transaction { description, .. } => description.clone(),
            DecisionData::Sale {
                recent_products, ..
            } => recent_products.join(" "),
            DecisionData::Payment { payer, .. } => payer.clone(),
            DecisionData::Generic(value) => value.to_string(),
        }
    }
}

/// Recognized request constraints. Unknown options are rejected at the API
/// boundary, not silently dropped here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionConstraints {
    /// Confidence floor below which the orchestrator keeps escalating.
    pub min_confidence: Option<u8>,
    /// Soft processing budget; engines may use it to skip expensive paths.
    pub max_processing_ms: Option<u64>,
}

/// Immutable description of one decision request.
///
/// Built once by the caller and never mutated; everything downstream works on
/// shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub request_id: DecisionId,
    pub tenant_id: TenantId,
    pub decision_type: DecisionType,
    pub primary_data: DecisionData,
    /// Auxiliary context, e.g. recent history the caller thinks is relevant.
    pub additional_data: JsonValue,
    pub constraints: DecisionConstraints,
    /// Origin subsystem (e.g. "bank_reconciliation", "pos").
    pub source: String,
    pub requested_at: DateTime<Utc>,
}

impl DecisionContext {
    pub fn new(tenant_id: TenantId, decision_type: DecisionType, primary_data: DecisionData) -> Self {
        Self {
            request_id: DecisionId::new(),
            tenant_id,
            decision_type,
            primary_data,
            additional_data: JsonValue::Null,
            constraints: DecisionConstraints::default(),
            source: String::new(),
            requested_at: Utc::now(),
        }
    }

    pub fn with_request_id(mut self, request_id: DecisionId) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_additional_data(mut self, additional_data: JsonValue) -> Self {
        self.additional_data = additional_data;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.constraints.min_confidence = Some(min_confidence);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Effective escalation floor for this request.
    pub fn min_confidence(&self) -> u8 {
        self.constraints
            .min_confidence
            .unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }
}
