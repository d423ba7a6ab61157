//! Per-operation counters and timers.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Serialize;

/// Metrics for a single operation (or the history endpoints).
#[derive(Debug, Clone, Default)]
pub struct OperationMetrics {
    pub calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_time: Duration,
    pub avg_time: Duration,
}

impl OperationMetrics {
    /// Calculate success rate.
    pub fn success_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.successes as f64 / self.calls as f64
        }
    }

    fn record(&mut self, duration: Duration) {
        self.calls += 1;
        self.total_time += duration;
        self.avg_time = self.total_time.div_f64(self.calls as f64);
    }
}

/// Collects and aggregates service metrics.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_calls: u64,
    successful_calls: u64,
    operations: HashMap<String, OperationMetrics>,
    error_types: HashMap<String, u64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call.
    pub fn record_success(&mut self, operation: &str, duration: Duration) {
        self.total_calls += 1;
        self.successful_calls += 1;

        let op = self.operations.entry(operation.to_string()).or_default();
        op.record(duration);
        op.successes += 1;
    }

    /// Record a failed call, categorized by error kind.
    pub fn record_failure(&mut self, operation: &str, kind: &str, duration: Duration) {
        self.total_calls += 1;

        let op = self.operations.entry(operation.to_string()).or_default();
        op.record(duration);
        op.failures += 1;

        *self.error_types.entry(kind.to_string()).or_default() += 1;
    }

    /// Record a history write that failed. The call itself still succeeded.
    pub fn record_persistence_failure(&mut self) {
        *self.error_types.entry("persistence".to_string()).or_default() += 1;
    }

    /// Get metrics for a specific operation.
    pub fn operation(&self, operation: &str) -> Option<&OperationMetrics> {
        self.operations.get(operation)
    }

    /// Get success rate.
    pub fn success_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.successful_calls as f64 / self.total_calls as f64
        }
    }

    /// Generate a summary report.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_calls: self.total_calls,
            success_rate: self.success_rate(),
            operations: self
                .operations
                .iter()
                .map(|(name, m)| {
                    (
                        name.clone(),
                        OperationSummary {
                            calls: m.calls,
                            successes: m.successes,
                            failures: m.failures,
                            avg_time_ms: m.avg_time.as_secs_f64() * 1000.0,
                        },
                    )
                })
                .collect(),
            errors: self
                .error_types
                .iter()
                .map(|(kind, count)| (kind.clone(), *count))
                .collect(),
        }
    }
}

/// Summary of collected metrics, as served over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_calls: u64,
    pub success_rate: f64,
    pub operations: BTreeMap<String, OperationSummary>,
    pub errors: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationSummary {
    pub calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub avg_time_ms: f64,
}
