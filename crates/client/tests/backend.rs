use std::time::Duration;

use api_types::transaction::{NewTransaction, TransactionId};
use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use client::{Client, ClientError};
use serde_json::{Value, json};

const API_PREFIX: &str = "/fraud-detection/api/v1";

async fn spawn_backend(api: Router) -> Client {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().nest(API_PREFIX, api);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Client::new(&format!("http://{addr}{API_PREFIX}"), Duration::from_secs(2)).unwrap()
}

fn new_transaction() -> NewTransaction {
    NewTransaction {
        account_number: "ACC042".to_string(),
        transaction_type: "PURCHASE".to_string(),
        amount: 250.0,
        location: "Tokyo".to_string(),
        country: "Japan".to_string(),
        city: "Tokyo".to_string(),
    }
}

#[tokio::test]
async fn dashboard_fetches_both_halves() {
    let api = Router::new()
        .route(
            "/transactions",
            get(|| async {
                Json(json!([
                    {"id": 1, "accountNumber": "ACC001", "riskLevel": "HIGH", "fraudScore": 88},
                    {"id": 2, "accountNumber": "ACC002"}
                ]))
            }),
        )
        .route(
            "/metrics/summary",
            get(|| async { Json(json!({"totalTransactions": 2, "fraudRate": 50.0})) }),
        );
    let client = spawn_backend(api).await;

    let result = client.fetch_dashboard().await;
    let records = result.transactions.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].risk_level.as_deref(), Some("HIGH"));
    let summary = result.metrics.unwrap().unwrap();
    assert_eq!(summary.total_transactions, Some(2));
}

#[tokio::test]
async fn halves_fail_independently() {
    let api = Router::new()
        .route(
            "/transactions",
            get(|| async { Json(json!({"id": "tx-9", "amount": 12.5})) }),
        )
        .route(
            "/metrics/summary",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "db down"}))) }),
        );
    let client = spawn_backend(api).await;

    let result = client.fetch_dashboard().await;
    let records = result.transactions.unwrap().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(TransactionId::Text("tx-9".to_string())));
    assert!(result.metrics.unwrap_err().contains("db down"));
}

#[tokio::test]
async fn malformed_record_does_not_drop_the_batch() {
    let api = Router::new().route(
        "/transactions",
        get(|| async {
            Json(json!([
                {"id": 1, "riskLevel": "HIGH", "fraudScore": 88},
                {"id": 2, "fraudScore": "n/a"},
                "not a record"
            ]))
        }),
    );
    let client = spawn_backend(api).await;

    let records = client.list_transactions().await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].fraud_score, Some(88.0));
    assert_eq!(records[1].id, Some(TransactionId::Number(2)));
    assert_eq!(records[1].fraud_score, None);
}

#[tokio::test]
async fn empty_list_body_is_none() {
    let api = Router::new().route("/transactions", get(|| async { "" }));
    let client = spawn_backend(api).await;
    assert!(client.list_transactions().await.unwrap().is_none());
}

#[tokio::test]
async fn create_sends_json_and_reads_echo() {
    let api = Router::new().route(
        "/transactions",
        post(|headers: HeaderMap, Json(body): Json<NewTransaction>| async move {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "id": 77,
                "accountNumber": body.account_number,
                "amount": body.amount,
                "riskLevel": "LOW",
                "fraudReason": content_type,
            }))
        }),
    );
    let client = spawn_backend(api).await;

    let created = client
        .create_transaction(&new_transaction())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.id, Some(TransactionId::Number(77)));
    assert_eq!(created.account_number.as_deref(), Some("ACC042"));
    assert_eq!(created.amount, Some(250.0));
    assert_eq!(created.fraud_reason.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn rejection_message_is_verbatim() {
    let api = Router::new().route(
        "/transactions",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Account ACC042 is blocked"})),
            )
        }),
    );
    let client = spawn_backend(api).await;

    let err = client.create_transaction(&new_transaction()).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.message(), "Account ACC042 is blocked");
}

#[tokio::test]
async fn get_and_delete_by_id() {
    async fn get_one(Path(id): Path<String>) -> impl IntoResponse {
        if id == "5" {
            Json(json!({"id": 5, "location": "Dubai"})).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }
    async fn delete_one(Path(id): Path<String>) -> StatusCode {
        if id == "5" {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        }
    }
    let api = Router::new().route("/transactions/{id}", get(get_one).delete(delete_one));
    let client = spawn_backend(api).await;

    let found = client.get_transaction(&TransactionId::Number(5)).await.unwrap();
    assert_eq!(found.location.as_deref(), Some("Dubai"));
    client.delete_transaction(&TransactionId::Number(5)).await.unwrap();

    let missing = client.delete_transaction(&TransactionId::Number(6)).await;
    assert!(matches!(missing, Err(ClientError::NotFound)));
}

#[tokio::test]
async fn batch_rules_scenarios_and_health() {
    let api = Router::new()
        .route(
            "/transactions/batch",
            post(|Json(body): Json<Vec<Value>>| async move {
                let created: Vec<Value> = body
                    .iter()
                    .enumerate()
                    .map(|(i, _)| json!({"id": i + 1}))
                    .collect();
                Json(Value::Array(created))
            }),
        )
        .route(
            "/metrics/rule-breakdown",
            get(|| async {
                Json(json!({
                    "ruleCounts": {"HIGH_AMOUNT": 3},
                    "rulePercentages": {"HIGH_AMOUNT": 75.0, "NEW_DEVICE": 25.0},
                    "mostCommonRule": "HIGH_AMOUNT"
                }))
            }),
        )
        .route(
            "/metrics/effectiveness",
            get(|| async { Json(json!({"detectionRate": 91.5, "rating": "EXCELLENT"})) }),
        )
        .route(
            "/scenarios/run-all",
            post(|| async {
                Json(json!({
                    "totalScenarios": 2,
                    "passed": 1,
                    "failed": 1,
                    "successRate": 50.0,
                    "overallStatus": "PARTIAL_PASS",
                    "scenarios": [
                        {"scenario": "Velocity attack", "testPassed": true, "score": 85.0},
                        {"scenario": "Geo hop", "testPassed": false}
                    ]
                }))
            }),
        )
        .route("/health", get(|| async { "Fraud detection service is running" }));
    let client = spawn_backend(api).await;

    let created = client
        .create_batch(&[new_transaction(), new_transaction()])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    let rules = client.rule_breakdown().await.unwrap();
    assert_eq!(rules.rule_percentages.get("NEW_DEVICE"), Some(&25.0));
    assert_eq!(rules.most_common_rule.as_deref(), Some("HIGH_AMOUNT"));

    let effectiveness = client.effectiveness().await.unwrap();
    assert_eq!(effectiveness.rating.as_deref(), Some("EXCELLENT"));

    let report = client.run_scenarios().await.unwrap();
    assert_eq!(report.scenarios.len(), 2);
    assert!(!report.scenarios[1].test_passed);

    let health = client.health().await.unwrap();
    assert_eq!(
        health.status.as_deref(),
        Some("Fraud detection service is running")
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(&format!("http://{addr}{API_PREFIX}"), Duration::from_secs(2)).unwrap();
    let err = client.list_transactions().await.unwrap_err();
    assert!(err.is_unavailable());

    let result = client.fetch_dashboard().await;
    assert!(result.transactions.is_err());
    assert!(result.metrics.is_err());
}
