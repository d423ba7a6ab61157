//! History records and query filters.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::calculator::{Operands, Operation};
use crate::error::{CalculatorError, Result};

pub(crate) const INVALID_DATE: &str = "Formato de fecha inválido. Use YYYY-MM-DD.";

/// One persisted computation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub id: Uuid,
    pub operation: Operation,
    pub operands: Vec<f64>,
    pub result: f64,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Record a computation that happened just now.
    pub fn new(operation: Operation, operands: &Operands, result: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            operands: operands.as_slice().to_vec(),
            result,
            timestamp: Utc::now(),
        }
    }

    /// Override the creation time (imports and tests).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Which records a history query returns.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryFilter {
    All,
    Operation(Operation),
    /// Half-open interval `[start, end)`.
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl HistoryFilter {
    /// Filter by operation name or route code. Unknown names are a 404.
    pub fn for_operation(raw: &str) -> Result<Self> {
        raw.parse::<Operation>()
            .map(HistoryFilter::Operation)
            .map_err(CalculatorError::NotFound)
    }

    /// Filter on a single UTC day given as `YYYY-MM-DD`.
    pub fn for_date(raw: &str) -> Result<Self> {
        if raw.len() != 10 {
            return Err(CalculatorError::Validation(INVALID_DATE.to_string()));
        }
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| CalculatorError::Validation(INVALID_DATE.to_string()))?;
        let next = day
            .succ_opt()
            .ok_or_else(|| CalculatorError::Validation(INVALID_DATE.to_string()))?;

        Ok(HistoryFilter::Between {
            start: day.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        })
    }

    pub fn matches(&self, record: &OperationRecord) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Operation(op) => record.operation == *op,
            HistoryFilter::Between { start, end } => {
                record.timestamp >= *start && record.timestamp < *end
            }
        }
    }
}

/// Sort order of history results, by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    #[default]
    Ascending,
    Descending,
}

impl HistoryOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            HistoryOrder::Ascending => "ASC",
            HistoryOrder::Descending => "DESC",
        }
    }
}

impl std::str::FromStr for HistoryOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(HistoryOrder::Ascending),
            "desc" | "descending" => Ok(HistoryOrder::Descending),
            _ => Err(format!(
                "invalid history order '{}', expected 'asc' or 'desc'",
                s
            )),
        }
    }
}
