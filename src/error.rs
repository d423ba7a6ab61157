//! Error types for the calculator service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::calculator::Operation;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// History store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<deadpool_postgres::PoolError> for DatabaseError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        DatabaseError::Pool(e.to_string())
    }
}

/// Errors returned by calculator operations.
///
/// Each variant maps onto one HTTP status; see [`CalculatorError::status`].
#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    /// Missing, non-numeric or insufficient operands, or a malformed filter.
    #[error("{0}")]
    Validation(String),

    /// Operands the service refuses to operate on (negatives, zero divisors).
    #[error("{0}")]
    Forbidden(String),

    /// Unknown operation in a history filter.
    #[error("{0}")]
    NotFound(String),

    /// A batch item failed validation; the whole batch was aborted.
    #[error("{source}")]
    Batch {
        index: usize,
        operation: Operation,
        operands: Vec<f64>,
        #[source]
        source: Box<CalculatorError>,
    },

    #[error("History store error: {0}")]
    Database(#[from] DatabaseError),
}

impl CalculatorError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            CalculatorError::Validation(_) => StatusCode::BAD_REQUEST,
            CalculatorError::Forbidden(_) => StatusCode::FORBIDDEN,
            CalculatorError::NotFound(_) => StatusCode::NOT_FOUND,
            CalculatorError::Batch { source, .. } => source.status(),
            CalculatorError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short category name used by the metrics collector.
    pub fn kind(&self) -> &'static str {
        match self {
            CalculatorError::Validation(_) => "validation",
            CalculatorError::Forbidden(_) => "forbidden",
            CalculatorError::NotFound(_) => "not_found",
            CalculatorError::Batch { source, .. } => source.kind(),
            CalculatorError::Database(_) => "persistence",
        }
    }
}

impl IntoResponse for CalculatorError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            CalculatorError::Batch {
                index,
                operation,
                operands,
                source,
            } => json!({
                "message": source.to_string(),
                "indice": index,
                "operacion_fallida": operation.code(),
                "numeros_enviados": operands,
            }),
            CalculatorError::Database(e) => {
                tracing::error!("History query failed: {}", e);
                json!("Error al consultar el historial.")
            }
            other => json!(other.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type for calculator operations.
pub type Result<T> = std::result::Result<T, CalculatorError>;
