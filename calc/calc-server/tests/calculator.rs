use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use calc_sdk::CalculatorMethod;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use typedrpc::{net::server::router, DispatchError, FailureKind, MethodName};

async fn dispatch(method: &str, input: Value) -> Result<Value, DispatchError> {
    let registry = calc_server::registry().unwrap();
    registry.dispatch(method, input).await
}

#[tokio::test]
async fn scenario_a_add() {
    let output = dispatch("add", json!({"augend": 2, "addend": 2})).await.unwrap();
    assert_eq!(output, json!({"sum": 4.0}));
}

#[tokio::test]
async fn scenario_b_subtract() {
    let output = dispatch("subtract", json!({"minuend": 10, "subtrahend": 3}))
        .await
        .unwrap();
    assert_eq!(output, json!({"difference": 7.0}));
}

#[tokio::test]
async fn scenario_c_unregistered_method() {
    let err = dispatch("multiply", json!({"a": 1, "b": 2})).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnknownMethod);
}

#[tokio::test]
async fn scenario_d_wrong_type() {
    let err = dispatch("add", json!({"augend": "two", "addend": 2}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ValidationFailed);
    assert!(err.to_string().contains("augend"), "{err}");
    match err {
        DispatchError::ValidationFailed(errors) => assert_eq!(errors.issues()[0].path, "augend"),
        other => panic!("expected validation failure, got {other}"),
    }
}

#[tokio::test]
async fn scenario_e_missing_field() {
    let err = dispatch("add", json!({"augend": 2})).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ValidationFailed);
    assert!(err.to_string().contains("addend"), "{err}");
}

#[tokio::test]
async fn overflow_is_an_implementation_error() {
    let err = dispatch("add", json!({"augend": f64::MAX, "addend": f64::MAX}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ImplementationError);
    assert_eq!(err.to_string(), "method failed: result of add is not a finite number");
}

#[test]
fn registry_serves_exactly_the_declared_names() {
    let registry = calc_server::registry().unwrap();
    let declared: Vec<_> = CalculatorMethod::ALL.iter().map(|m| m.as_str()).collect();
    assert_eq!(registry.method_names().collect::<Vec<_>>(), declared);
    assert_eq!(declared, ["add", "subtract"]);
}

#[tokio::test]
async fn add_over_http() {
    let app = router(Arc::new(calc_server::registry().unwrap()));
    let request = Request::builder()
        .method("POST")
        .uri("/rpc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"method": "add", "input": {"augend": 2, "addend": 2}}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["sum"], 4.0);
}
