//! End-to-end tests of `HttpBackend` and `Register` against a stub backend
//! served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use till_client::backend::IDEMPOTENCY_HEADER;
use till_client::config::ApiConfig;
use till_client::wire::TransactionRequest;
use till_client::{HttpBackend, PosBackend, Register};
use till_core::{
    CheckoutError, CheckoutRequest, IdempotencyKey, LookupError, Money, Product, Status, Ticket,
};

// =============================================================================
// Stub Backend
// =============================================================================

#[derive(Debug, Clone)]
struct Submission {
    idempotency_key: Option<String>,
    body: TransactionRequest,
}

#[derive(Clone, Default)]
struct StubState {
    submissions: Arc<Mutex<Vec<Submission>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StubState {
    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

async fn product_handler(State(state): State<StubState>, Path(code): Path<String>) -> Response {
    state.lookups.lock().unwrap().push(code.clone());

    match code.as_str() {
        "4901234567894" => Json(json!({
            "PRD_ID": 1,
            "NAME": "Tea",
            "CODE": "4901234567894",
            "PRICE": 150
        }))
        .into_response(),
        "4901234567900" => Json(json!({
            "PRD_ID": 2,
            "NAME": "Coffee",
            "CODE": "4901234567900",
            "PRICE": 180.0
        }))
        .into_response(),
        "5000000000000" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": "Inventory service down" })),
        )
            .into_response(),
        "6000000000000" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        "7000000000000" => Json(json!({ "PRD_ID": 7, "NAME": "Half" })).into_response(),
        "a/b" => Json(json!({
            "PRD_ID": 9,
            "NAME": "Slash",
            "CODE": "a/b",
            "PRICE": 1
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Product not found" })),
        )
            .into_response(),
    }
}

async fn transaction_handler(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<TransactionRequest>,
) -> Response {
    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let total: i64 = body.items.iter().map(|i| i.price).sum();
    let emp_cd = body.emp_cd.clone();

    state.submissions.lock().unwrap().push(Submission {
        idempotency_key,
        body,
    });

    match emp_cd.as_str() {
        "REJECT" => (StatusCode::BAD_REQUEST, Json(json!({ "detail": "bad operator" }))).into_response(),
        "GARBLED" => Json(json!({ "STATUS": "ok" })).into_response(),
        _ => Json(json!({ "TOTAL_AMT": total })).into_response(),
    }
}

async fn spawn_stub() -> (ApiConfig, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/products/{code}", get(product_handler))
        .route("/transactions", post(transaction_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    (config, state)
}

fn tea() -> Product {
    Product {
        id: 1,
        name: "Tea".into(),
        code: "4901234567894".into(),
        price: Money::from_amount(150),
    }
}

fn request(items: Vec<Product>, operator_code: &str) -> CheckoutRequest {
    CheckoutRequest {
        ticket: Ticket::new(1),
        operator_code: operator_code.into(),
        items,
        idempotency_key: IdempotencyKey::generate(),
    }
}

// =============================================================================
// HttpBackend
// =============================================================================

#[tokio::test]
async fn test_lookup_outcomes_over_http() {
    let (config, _state) = spawn_stub().await;
    let backend = HttpBackend::new(&config).unwrap();

    assert_eq!(backend.lookup("4901234567894").await, Ok(tea()));
    assert_eq!(
        backend.lookup("4901234567900").await.unwrap().price.amount(),
        180
    );
    assert_eq!(
        backend.lookup("0000000000000").await,
        Err(LookupError::NotFound)
    );
    assert_eq!(
        backend.lookup("5000000000000").await,
        Err(LookupError::rejected("Inventory service down"))
    );
    assert_eq!(
        backend.lookup("6000000000000").await,
        Err(LookupError::rejected_generic())
    );
    assert_eq!(
        backend.lookup("7000000000000").await,
        Err(LookupError::rejected_generic())
    );
}

#[tokio::test]
async fn test_code_travels_as_one_path_segment() {
    let (config, state) = spawn_stub().await;
    let backend = HttpBackend::new(&config).unwrap();

    let product = backend.lookup("a/b").await.unwrap();
    assert_eq!(product.name, "Slash");
    assert_eq!(state.lookups(), vec!["a/b"]);
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
        connect_timeout_secs: 1,
    })
    .unwrap();

    let err = backend.lookup("4901234567894").await.unwrap_err();
    assert!(matches!(err, LookupError::Unreachable { .. }));
    assert_eq!(err.to_string(), "A server error occurred.");

    assert_eq!(
        backend.checkout(&request(vec![tea()], "")).await,
        Err(CheckoutError::failed())
    );
}

#[tokio::test]
async fn test_checkout_payload_and_header() {
    let (config, state) = spawn_stub().await;
    let backend = HttpBackend::new(&config).unwrap();

    let req = request(vec![tea(), tea()], "");
    let receipt = backend.checkout(&req).await.unwrap();
    assert_eq!(receipt.total.amount(), 300);
    assert_eq!(receipt.line_count, 2);

    let sent = state.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].idempotency_key.as_deref(), Some(req.idempotency_key.as_str()));
    assert_eq!(sent[0].body.emp_cd, "");
    assert_eq!(sent[0].body.items.len(), 2);
    assert_eq!(sent[0].body.items[0].code, "4901234567894");
}

#[tokio::test]
async fn test_checkout_failures() {
    let (config, _state) = spawn_stub().await;
    let backend = HttpBackend::new(&config).unwrap();

    assert_eq!(
        backend.checkout(&request(vec![tea()], "REJECT")).await,
        Err(CheckoutError::failed())
    );

    let err = backend
        .checkout(&request(vec![tea()], "GARBLED"))
        .await
        .unwrap_err();
    assert_ne!(err, CheckoutError::failed());
    assert!(matches!(err, CheckoutError::Failed { .. }));
}

// =============================================================================
// Register over HTTP
// =============================================================================

#[tokio::test]
async fn test_example_scenario() {
    let (config, state) = spawn_stub().await;
    let mut register = Register::new(HttpBackend::new(&config).unwrap(), "");

    // 1. lookup → 200 Tea
    register.set_input("4901234567894");
    register.lookup().await;
    assert_eq!(register.session().staged(), Some(&tea()));

    // 2. add → cart=[Tea]
    register.add_staged();
    assert_eq!(register.session().cart().products(), vec![tea()]);
    assert_eq!(register.session().input(), "");

    // 3. lookup unknown → 404, cart unchanged
    register.set_input("0000000000000");
    register.lookup().await;
    assert_eq!(
        register.session().status(),
        &Status::Error(LookupError::NotFound.into())
    );
    assert_eq!(register.session().cart().products(), vec![tea()]);

    // 4. purchase → TOTAL_AMT 150 → cart=[]
    register.checkout().await;
    assert!(register.session().cart().is_empty());
    assert_eq!(register.session().last_receipt().unwrap().total.amount(), 150);
    assert!(register.session().status().is_idle());

    assert_eq!(state.submissions().len(), 1);
}

#[tokio::test]
async fn test_failed_checkout_is_retried_with_same_key() {
    let (config, state) = spawn_stub().await;
    let mut register = Register::new(HttpBackend::new(&config).unwrap(), "REJECT");

    register.set_input("4901234567894");
    register.lookup().await;
    register.add_staged();

    register.checkout().await;
    assert_eq!(register.session().cart().len(), 1);
    assert_eq!(
        register.session().status().message().as_deref(),
        Some("Failed to register the transaction")
    );

    register.set_operator("").unwrap();
    register.checkout().await;
    assert!(register.session().cart().is_empty());

    let sent = state.submissions();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].idempotency_key.is_some());
    assert_eq!(sent[0].idempotency_key, sent[1].idempotency_key);
}
