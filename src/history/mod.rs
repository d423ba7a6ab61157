//! Operation history and its persistence layer.
//!
//! Every successful computation is recorded as an [`OperationRecord`]:
//! - PostgreSQL ([`PgStore`]) in production
//! - an in-process list ([`MemoryStore`]) for tests and throwaway runs

mod memory;
mod record;
mod store;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use record::{HistoryFilter, HistoryOrder, OperationRecord};
pub use store::PgStore;

use crate::config::{Config, HistoryBackend};
use crate::db::HistoryStore;
use crate::error::DatabaseError;

/// Open the history store selected by the configuration.
///
/// The PostgreSQL backend runs pending migrations before returning.
pub async fn open_store(config: &Config) -> Result<Arc<dyn HistoryStore>, DatabaseError> {
    match config.history.backend {
        HistoryBackend::Memory => {
            tracing::warn!("Using in-memory history store, records are lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        HistoryBackend::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| {
                DatabaseError::Pool("DATABASE_URL is required for the postgres backend".to_string())
            })?;
            let store = PgStore::new(database).await?;
            store.run_migrations().await?;
            Ok(Arc::new(store))
        }
    }
}
