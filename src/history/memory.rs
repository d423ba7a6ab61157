//! In-process history store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::HistoryStore;
use crate::error::DatabaseError;
use crate::history::{HistoryFilter, HistoryOrder, OperationRecord};

/// History kept in a `Vec`, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<OperationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert(&self, record: &OperationRecord) -> Result<(), DatabaseError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find(
        &self,
        filter: &HistoryFilter,
        order: HistoryOrder,
    ) -> Result<Vec<OperationRecord>, DatabaseError> {
        let records = self.records.read().await;
        let mut matched: Vec<OperationRecord> =
            records.iter().filter(|r| filter.matches(r)).cloned().collect();

        if order == HistoryOrder::Descending {
            matched.reverse();
        }

        Ok(matched)
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.records.read().await.len() as u64)
    }
}
