//! Request and response DTOs for the calculator API.
//!
//! Wire names follow the service's published contract (`numeros`,
//! `resultado`, `historial`, ...), so Rust field names are renamed.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::calculator::{BatchItem, Computation, Operands, Operation};
use crate::error::{CalculatorError, Result};
use crate::history::OperationRecord;

// --- Single operations ---

/// Extract operands from raw query pairs.
///
/// Repeated `nums` parameters are the primary form. When none are given,
/// the two-operand `a`/`b` form is accepted.
pub(crate) fn operands_from_query(params: &[(String, String)]) -> Result<Operands> {
    let nums: Vec<&str> = params
        .iter()
        .filter(|(k, _)| k == "nums")
        .map(|(_, v)| v.as_str())
        .collect();

    if !nums.is_empty() {
        return Operands::parse(nums);
    }

    let legacy: Vec<&str> = ["a", "b"]
        .iter()
        .filter_map(|key| params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()))
        .collect();

    if legacy.is_empty() {
        return Err(CalculatorError::Validation(
            "Faltan los números de la operación (parámetro 'nums').".to_string(),
        ));
    }

    Operands::parse(legacy)
}

#[derive(Debug, Serialize)]
pub struct ComputeResponse {
    #[serde(rename = "operacion")]
    pub operation: Operation,
    #[serde(rename = "numeros")]
    pub operands: Vec<f64>,
    #[serde(rename = "resultado")]
    pub result: f64,
}

impl From<Computation> for ComputeResponse {
    fn from(c: Computation) -> Self {
        Self {
            operation: c.operation,
            operands: c.operands,
            result: c.result,
        }
    }
}

// --- Batch ---

/// An operation as the client spelled it: route code or stored name, any case.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedOperation {
    pub raw: String,
    pub operation: Operation,
}

impl<'de> Deserialize<'de> for RequestedOperation {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let operation = raw.parse().map_err(serde::de::Error::custom)?;
        Ok(Self { raw, operation })
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchItemRequest {
    pub op: RequestedOperation,
    pub nums: Vec<f64>,
}

impl From<BatchItemRequest> for BatchItem {
    fn from(req: BatchItemRequest) -> Self {
        Self {
            operation: req.op.operation,
            operands: req.nums,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchItemResponse {
    /// The operation exactly as the client sent it.
    pub op: String,
    pub result: f64,
}

impl BatchItemResponse {
    pub fn new(op: String, computation: &Computation) -> Self {
        Self {
            op,
            result: computation.result,
        }
    }
}

// --- History ---

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(rename = "operacion")]
    pub operation: Operation,
    #[serde(rename = "numeros")]
    pub operands: Vec<f64>,
    #[serde(rename = "resultado")]
    pub result: f64,
    /// ISO-8601, UTC.
    pub date: String,
}

impl From<OperationRecord> for HistoryEntry {
    fn from(r: OperationRecord) -> Self {
        Self {
            id: r.id,
            operation: r.operation,
            operands: r.operands,
            result: r.result,
            date: r.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub historial: Vec<HistoryEntry>,
}

impl From<Vec<OperationRecord>> for HistoryResponse {
    fn from(records: Vec<OperationRecord>) -> Self {
        Self {
            historial: records.into_iter().map(HistoryEntry::from).collect(),
        }
    }
}

// --- System ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: Option<u64>,
}
