use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::history::{HistoryFilter, HistoryOrder, OperationRecord};

/// Persistence abstraction for the operation history.
///
/// Implementations must be safe for concurrent use; the service shares one
/// instance across all requests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record. Records are never updated afterwards.
    async fn insert(&self, record: &OperationRecord) -> Result<(), DatabaseError>;

    /// Records matching `filter`, sorted by insertion in `order`.
    async fn find(
        &self,
        filter: &HistoryFilter,
        order: HistoryOrder,
    ) -> Result<Vec<OperationRecord>, DatabaseError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, DatabaseError>;

    /// Release connections. Called once on shutdown.
    async fn close(&self) {}
}
