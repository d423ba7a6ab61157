//! End-to-end tests of the HTTP API against the in-memory history store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use calculadora::calculator::{Calculator, Operands, Operation};
use calculadora::db::HistoryStore;
use calculadora::history::{HistoryOrder, MemoryStore, OperationRecord};
use calculadora::server::{AppState, router};

fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let calculator = Calculator::new(store.clone(), HistoryOrder::Ascending);
    let state = AppState {
        calculator: Arc::new(calculator),
    };
    (router(state), store)
}

fn query(nums: &[&str]) -> String {
    nums.iter()
        .map(|n| format!("nums={n}"))
        .collect::<Vec<_>>()
        .join("&")
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn sum_with_n_numbers() {
    let (app, store) = app();

    let cases: [(&[&str], f64); 3] = [
        (&["10", "20", "30"], 60.0),
        (&["5.5", "4.5"], 10.0),
        (&["0", "0", "0"], 0.0),
    ];
    for (nums, expected) in cases {
        let (status, body) = get(&app, &format!("/calculadora/sum?{}", query(nums))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resultado"], expected);
        let sent: Vec<f64> = nums.iter().map(|n| n.parse().unwrap()).collect();
        assert_eq!(body["numeros"], json!(sent));
    }

    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn subtract_multiply_divide() {
    let (app, _store) = app();

    let cases: [(&str, &[&str], f64); 7] = [
        ("res", &["100", "10", "5"], 85.0),
        ("res", &["10.5", "0.5"], 10.0),
        ("res", &["5", "10"], -5.0),
        ("mul", &["5", "5", "2"], 50.0),
        ("mul", &["10", "0"], 0.0),
        ("div", &["100", "5", "2"], 10.0),
        ("div", &["0", "10"], 0.0),
    ];
    for (op, nums, expected) in cases {
        let (status, body) = get(&app, &format!("/calculadora/{op}?{}", query(nums))).await;
        assert_eq!(status, StatusCode::OK, "{op} {nums:?}");
        assert_eq!(body["resultado"], expected, "{op} {nums:?}");
    }
}

#[tokio::test]
async fn legacy_a_b_parameters() {
    let (app, _store) = app();
    let (status, body) = get(&app, "/calculadora/sum?a=2&b=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resultado"], 5.0);
    assert_eq!(body["numeros"], json!([2.0, 3.0]));
}

#[tokio::test]
async fn negative_numbers_are_forbidden() {
    let (app, store) = app();

    for op in ["sum", "res", "mul", "div"] {
        let (status, _) = get(&app, &format!("/calculadora/{op}?nums=10&nums=-5")).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{op}");
    }

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn division_by_zero_in_list() {
    let (app, store) = app();

    let (status, body) = get(&app, "/calculadora/div?nums=100&nums=10&nums=0&nums=5").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["detail"].is_string());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_operands_are_bad_requests() {
    let (app, store) = app();

    for uri in [
        "/calculadora/sum",
        "/calculadora/sum?nums=5",
        "/calculadora/mul?nums=5&nums=abc",
        "/calculadora/div?nums=1&nums=nan",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].is_string(), "{uri}");
    }

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn batch_success() {
    let (app, store) = app();

    let payload = json!([{"op": "sum", "nums": [10, 20]}, {"op": "res", "nums": [100, 10]}]);
    let (status, body) = post_json(&app, "/calculadora/lote", payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"op": "sum", "result": 30.0}, {"op": "res", "result": 90.0}])
    );
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn batch_with_insufficient_numbers() {
    let (app, store) = app();

    let payload = json!([{"op": "sum", "nums": [10, 5]}, {"op": "mul", "nums": [5]}]);
    let (status, body) = post_json(&app, "/calculadora/lote", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"]["message"],
        "Se requieren al menos dos números para una operación."
    );
    assert_eq!(body["detail"]["operacion_fallida"], "mul");
    assert_eq!(body["detail"]["numeros_enviados"], json!([5.0]));
    assert_eq!(body["detail"]["indice"], 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn batch_with_unknown_operation() {
    let (app, _store) = app();

    let payload = json!([{"op": "pow", "nums": [2, 3]}]);
    let (status, _) = post_json(&app, "/calculadora/lote", payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_echoes_operation_as_sent() {
    let (app, _store) = app();

    let payload = json!([{"op": "resta", "nums": [10, 4]}, {"op": "mul", "nums": [2, 3]}]);
    let (status, body) = post_json(&app, "/calculadora/lote", payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"op": "resta", "result": 6.0}, {"op": "mul", "result": 6.0}])
    );
}

#[tokio::test]
async fn overflowing_result_is_rejected() {
    let (app, store) = app();

    for uri in [
        "/calculadora/mul?nums=1e200&nums=1e200",
        "/calculadora/div?nums=1&nums=1e-320",
        "/calculadora/sum?nums=1.7e308&nums=1.7e308",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body["detail"], "El resultado excede el rango numérico.",
            "{uri}"
        );
    }

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn batch_with_overflowing_item() {
    let (app, store) = app();

    let payload = json!([
        {"op": "sum", "nums": [1, 2]},
        {"op": "mul", "nums": [1e200, 1e200]}
    ]);
    let (status, body) = post_json(&app, "/calculadora/lote", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"]["message"],
        "El resultado excede el rango numérico."
    );
    assert_eq!(body["detail"]["indice"], 1);
    assert_eq!(body["detail"]["operacion_fallida"], "mul");
    assert_eq!(body["detail"]["numeros_enviados"], json!([1e200, 1e200]));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn history_lists_all_operations() {
    let (app, _store) = app();

    get(&app, "/calculadora/sum?nums=10&nums=5").await;
    get(&app, "/calculadora/mul?nums=3&nums=4").await;

    let (status, body) = get(&app, "/calculadora/historial").await;
    assert_eq!(status, StatusCode::OK);

    let historial = body["historial"].as_array().unwrap();
    assert_eq!(historial.len(), 2);

    let mut results: Vec<f64> = historial
        .iter()
        .map(|item| item["resultado"].as_f64().unwrap())
        .collect();
    results.sort_by(f64::total_cmp);
    assert_eq!(results, vec![12.0, 15.0]);

    assert_eq!(historial[0]["numeros"], json!([10.0, 5.0]));
    assert_eq!(historial[0]["operacion"], "suma");
    assert!(historial[0]["date"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn history_by_operation() {
    let (app, store) = app();

    let now = Utc::now();
    for values in [[1.0, 2.0], [10.0, 10.0]] {
        let operands = Operands::new(values.to_vec()).unwrap();
        let result = Operation::Sum.fold(&operands);
        store
            .insert(&OperationRecord::new(Operation::Sum, &operands, result).with_timestamp(now))
            .await
            .unwrap();
    }
    get(&app, "/calculadora/div?nums=9&nums=3").await;

    let (status, body) = get(&app, "/calculadora/historial/operacion/suma").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["historial"].as_array().unwrap().len(), 2);

    let (status, _) = get(&app, "/calculadora/historial/operacion/potencia").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_by_date() {
    let (app, store) = app();

    let records = [
        (Operation::Sum, [1.0, 2.0], Utc.with_ymd_and_hms(2025, 9, 25, 10, 0, 0)),
        (Operation::Subtract, [10.0, 5.0], Utc.with_ymd_and_hms(2025, 9, 25, 15, 30, 0)),
        (Operation::Sum, [4.0, 4.0], Utc.with_ymd_and_hms(2025, 9, 26, 0, 0, 0)),
    ];
    for (op, values, at) in records {
        let operands = Operands::new(values.to_vec()).unwrap();
        let result = op.fold(&operands);
        let record = OperationRecord::new(op, &operands, result).with_timestamp(at.unwrap());
        store.insert(&record).await.unwrap();
    }

    let (status, body) = get(&app, "/calculadora/historial/fecha/2025-09-25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["historial"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn history_by_date_invalid_format() {
    let (app, _store) = app();

    let (status, body) = get(&app, "/calculadora/historial/fecha/25-09-2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Formato de fecha inválido. Use YYYY-MM-DD.");
}

#[tokio::test]
async fn health_and_metrics() {
    let (app, _store) = app();

    get(&app, "/calculadora/sum?nums=1&nums=2").await;
    get(&app, "/calculadora/div?nums=1&nums=0").await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"], 1);

    let (status, body) = get(&app, "/calculadora/metricas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_calls"], 2);
    assert_eq!(body["operations"]["suma"]["successes"], 1);
    assert_eq!(body["operations"]["division"]["failures"], 1);
    assert_eq!(body["errors"]["forbidden"], 1);
}
