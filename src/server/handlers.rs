use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::calculator::{BatchItem, Operation};
use crate::db::HistoryStore;
use crate::error::Result;
use crate::history::HistoryFilter;
use crate::metrics::MetricsSummary;
use crate::server::AppState;
use crate::server::types::{
    BatchItemRequest, BatchItemResponse, ComputeResponse, HealthResponse, HistoryResponse,
    operands_from_query,
};

type QueryPairs = Query<Vec<(String, String)>>;

async fn compute(
    state: AppState,
    operation: Operation,
    params: Vec<(String, String)>,
) -> Result<Json<ComputeResponse>> {
    let operands = operands_from_query(&params)
        .inspect_err(|e| state.calculator.record_rejected(operation.name(), e))?;

    let computation = state.calculator.compute(operation, operands).await?;
    Ok(Json(computation.into()))
}

pub async fn sum(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Json<ComputeResponse>> {
    compute(state, Operation::Sum, params).await
}

pub async fn subtract(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Json<ComputeResponse>> {
    compute(state, Operation::Subtract, params).await
}

pub async fn multiply(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Json<ComputeResponse>> {
    compute(state, Operation::Multiply, params).await
}

pub async fn divide(
    State(state): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Json<ComputeResponse>> {
    compute(state, Operation::Divide, params).await
}

pub async fn batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<BatchItemRequest>>,
) -> Result<Json<Vec<BatchItemResponse>>> {
    let sent: Vec<String> = items.iter().map(|item| item.op.raw.clone()).collect();
    let items: Vec<BatchItem> = items.into_iter().map(BatchItem::from).collect();
    let computations = state.calculator.batch_compute(items).await?;

    Ok(Json(
        sent.into_iter()
            .zip(&computations)
            .map(|(op, computation)| BatchItemResponse::new(op, computation))
            .collect(),
    ))
}

pub async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let records = state.calculator.list_history(HistoryFilter::All).await?;
    Ok(Json(records.into()))
}

pub async fn history_by_operation(
    State(state): State<AppState>,
    Path(op): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let records = state.calculator.history_by_operation(&op).await?;
    Ok(Json(records.into()))
}

pub async fn history_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let records = state.calculator.history_by_date(&date).await?;
    Ok(Json(records.into()))
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSummary> {
    Json(state.calculator.metrics_summary())
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.calculator.store().count().await {
        Ok(records) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                records: Some(records),
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check could not reach the history store: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    records: None,
                }),
            )
        }
    }
}
