//! PostgreSQL store for the operation history.

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime, Timeouts};
use secrecy::ExposeSecret;
use tokio_postgres::NoTls;
use tokio_postgres::Row;

use crate::calculator::Operation;
use crate::config::DatabaseConfig;
use crate::db::HistoryStore;
use crate::error::DatabaseError;
use crate::history::{HistoryFilter, HistoryOrder, OperationRecord};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

const SELECT_COLUMNS: &str = "SELECT id, operation, operands, result, created_at FROM operation_history";

/// Database store for the operation history.
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Create a new store and connect to the database.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut cfg = Config::new();
        cfg.url = Some(config.url().expose_secret().to_string());
        cfg.pool = Some(PoolConfig {
            max_size: config.pool_size,
            timeouts: Timeouts {
                wait: Some(config.connect_timeout),
                create: Some(config.connect_timeout),
                recycle: Some(config.connect_timeout),
            },
            ..Default::default()
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;

        // Test connection
        let _ = pool.get().await?;

        tracing::info!(pool_size = config.pool_size, "Connected to history database");

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let mut conn = self.conn().await?;
        let client: &mut tokio_postgres::Client = &mut conn;

        let report = embedded::migrations::runner().run_async(client).await?;
        for migration in report.applied_migrations() {
            tracing::info!("Applied migration {}", migration);
        }

        Ok(())
    }

    /// Get a connection from the pool.
    pub async fn conn(&self) -> Result<deadpool_postgres::Object, DatabaseError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn insert(&self, record: &OperationRecord) -> Result<(), DatabaseError> {
        let conn = self.conn().await?;

        conn.execute(
            r#"
            INSERT INTO operation_history (id, operation, operands, result, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            &[
                &record.id,
                &record.operation.name(),
                &record.operands,
                &record.result,
                &record.timestamp,
            ],
        )
        .await?;

        Ok(())
    }

    async fn find(
        &self,
        filter: &HistoryFilter,
        order: HistoryOrder,
    ) -> Result<Vec<OperationRecord>, DatabaseError> {
        let conn = self.conn().await?;
        let order = order.as_sql();

        let rows = match filter {
            HistoryFilter::All => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY seq {order}");
                conn.query(&sql, &[]).await?
            }
            HistoryFilter::Operation(op) => {
                let sql = format!("{SELECT_COLUMNS} WHERE operation = $1 ORDER BY seq {order}");
                conn.query(&sql, &[&op.name()]).await?
            }
            HistoryFilter::Between { start, end } => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE created_at >= $1 AND created_at < $2 ORDER BY seq {order}"
                );
                conn.query(&sql, &[start, end]).await?
            }
        };

        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        let conn = self.conn().await?;
        let row = conn
            .query_one("SELECT COUNT(*) AS total FROM operation_history", &[])
            .await?;
        let total: i64 = row.get("total");
        Ok(total as u64)
    }

    async fn close(&self) {
        self.pool.close();
        tracing::info!("History database pool closed");
    }
}

fn record_from_row(row: &Row) -> Result<OperationRecord, DatabaseError> {
    let name: String = row.get("operation");
    let operation = name
        .parse::<Operation>()
        .map_err(DatabaseError::Serialization)?;

    Ok(OperationRecord {
        id: row.get("id"),
        operation,
        operands: row.get("operands"),
        result: row.get("result"),
        timestamp: row.get("created_at"),
    })
}
