use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    let calculadora = Router::new()
        .route("/sum", get(handlers::sum))
        .route("/res", get(handlers::subtract))
        .route("/mul", get(handlers::multiply))
        .route("/div", get(handlers::divide))
        .route("/lote", post(handlers::batch))
        .route("/historial", get(handlers::history))
        .route("/historial/operacion/{op}", get(handlers::history_by_operation))
        .route("/historial/fecha/{date}", get(handlers::history_by_date))
        .route("/metricas", get(handlers::metrics));

    Router::new()
        .nest("/calculadora", calculadora)
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
