//! The calculator service: compute, persist, query.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::calculator::{Operands, Operation};
use crate::db::HistoryStore;
use crate::error::{CalculatorError, Result};
use crate::history::{HistoryFilter, HistoryOrder, OperationRecord};
use crate::metrics::{MetricsCollector, MetricsSummary};

/// Metrics key for history queries.
const HISTORY_METRIC: &str = "historial";

/// Outcome of a single computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Computation {
    pub operation: Operation,
    pub operands: Vec<f64>,
    pub result: f64,
}

/// One unvalidated entry of a batch request.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub operation: Operation,
    pub operands: Vec<f64>,
}

/// Handles every calculator request.
///
/// Holds the history store handle for the lifetime of the application.
/// History writes are best-effort: a failing store is logged and the
/// computed result is still returned.
pub struct Calculator {
    store: Arc<dyn HistoryStore>,
    order: HistoryOrder,
    metrics: Mutex<MetricsCollector>,
}

impl Calculator {
    pub fn new(store: Arc<dyn HistoryStore>, order: HistoryOrder) -> Self {
        Self {
            store,
            order,
            metrics: Mutex::new(MetricsCollector::new()),
        }
    }

    /// The underlying history store.
    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Check, evaluate and record one operation.
    pub async fn compute(&self, operation: Operation, operands: Operands) -> Result<Computation> {
        let started = Instant::now();

        let result = match operation.evaluate(&operands) {
            Ok(result) => result,
            Err(e) => {
                self.record_rejected(operation.name(), &e);
                tracing::debug!(operation = %operation, error = %e, "Operation rejected");
                return Err(e);
            }
        };

        self.persist(OperationRecord::new(operation, &operands, result))
            .await;

        self.metrics()
            .record_success(operation.name(), started.elapsed());

        Ok(Computation {
            operation,
            operands: operands.into_inner(),
            result,
        })
    }

    /// Evaluate every item, then record them in input order.
    ///
    /// The first invalid or overflowing item aborts the batch before anything
    /// is written.
    pub async fn batch_compute(&self, items: Vec<BatchItem>) -> Result<Vec<Computation>> {
        if items.is_empty() {
            let err = CalculatorError::Validation("El lote no contiene operaciones.".to_string());
            self.record_rejected("lote", &err);
            return Err(err);
        }

        let mut validated = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let evaluated = Operands::new(item.operands.clone()).and_then(|operands| {
                let result = item.operation.evaluate(&operands)?;
                Ok((operands, result))
            });

            match evaluated {
                Ok((operands, result)) => validated.push((item.operation, operands, result)),
                Err(source) => {
                    self.record_rejected(item.operation.name(), &source);
                    tracing::debug!(
                        index,
                        operation = %item.operation,
                        error = %source,
                        "Batch aborted"
                    );
                    return Err(CalculatorError::Batch {
                        index,
                        operation: item.operation,
                        operands: item.operands,
                        source: Box::new(source),
                    });
                }
            }
        }

        let mut computations = Vec::with_capacity(validated.len());
        for (operation, operands, result) in validated {
            let started = Instant::now();
            self.persist(OperationRecord::new(operation, &operands, result))
                .await;
            self.metrics()
                .record_success(operation.name(), started.elapsed());

            computations.push(Computation {
                operation,
                operands: operands.into_inner(),
                result,
            });
        }

        Ok(computations)
    }

    /// Records matching `filter`, in the configured order.
    pub async fn list_history(&self, filter: HistoryFilter) -> Result<Vec<OperationRecord>> {
        let started = Instant::now();

        match self.store.find(&filter, self.order).await {
            Ok(records) => {
                self.metrics()
                    .record_success(HISTORY_METRIC, started.elapsed());
                Ok(records)
            }
            Err(e) => {
                let err = CalculatorError::from(e);
                self.record_rejected(HISTORY_METRIC, &err);
                Err(err)
            }
        }
    }

    /// History filtered by an operation name or route code.
    pub async fn history_by_operation(&self, raw: &str) -> Result<Vec<OperationRecord>> {
        let filter = HistoryFilter::for_operation(raw)
            .inspect_err(|e| self.record_rejected(HISTORY_METRIC, e))?;
        self.list_history(filter).await
    }

    /// History for one UTC day, `YYYY-MM-DD`.
    pub async fn history_by_date(&self, raw: &str) -> Result<Vec<OperationRecord>> {
        let filter = HistoryFilter::for_date(raw)
            .inspect_err(|e| self.record_rejected(HISTORY_METRIC, e))?;
        self.list_history(filter).await
    }

    /// Count a request that failed before reaching the service proper.
    pub fn record_rejected(&self, operation: &str, err: &CalculatorError) {
        self.metrics()
            .record_failure(operation, err.kind(), std::time::Duration::ZERO);
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        self.metrics().summary()
    }

    async fn persist(&self, record: OperationRecord) {
        if let Err(e) = self.store.insert(&record).await {
            tracing::warn!(
                operation = %record.operation,
                error = %e,
                "Failed to persist operation history, returning result anyway"
            );
            self.metrics().record_persistence_failure();
        }
    }

    fn metrics(&self) -> MutexGuard<'_, MetricsCollector> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
