//! Integration tests for the heartbeat and restock jobs using wiremock HTTP mocks.

use std::path::PathBuf;
use std::time::Duration;

use crm_jobs::{
    probe, request_restock, run_heartbeat, run_restock, GraphqlClient, ProbeStatus,
    RestockOutcome,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer, timeout: Duration) -> GraphqlClient {
    GraphqlClient::new(&format!("{}/graphql", server.uri()), timeout)
        .expect("client construction should not fail")
}

fn temp_log(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("crm-jobs-{name}-{}.txt", uuid::Uuid::new_v4()))
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn probe_reports_responsive_when_hello_is_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("hello"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "hello": "Hello, GraphQL!" } })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(5));
    assert_eq!(probe(&client).await, ProbeStatus::Responsive);
}

#[tokio::test]
async fn probe_reports_failed_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(5));
    assert_eq!(probe(&client).await, ProbeStatus::Failed);
}

#[tokio::test]
async fn probe_reports_failed_when_hello_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "ping": "pong" } })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(5));
    assert_eq!(probe(&client).await, ProbeStatus::Failed);
}

#[tokio::test]
async fn probe_reports_error_when_data_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Unknown field \"hello\"" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(5));
    assert_eq!(probe(&client).await, ProbeStatus::Error);
}

#[tokio::test]
async fn probe_reports_error_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "hello": "late" } }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_millis(50));
    assert_eq!(probe(&client).await, ProbeStatus::Error);
}

#[tokio::test]
async fn heartbeat_appends_one_line_per_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "hello": "hi" } })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(5));
    let log = temp_log("heartbeat");

    let first = run_heartbeat(&client, &log).await;
    run_heartbeat(&client, &log).await;

    assert!(first.ends_with(" CRM is alive (GraphQL responsive)"), "{first}");
    let contents = std::fs::read_to_string(&log).expect("log written");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], first);
    std::fs::remove_file(&log).ok();
}

#[tokio::test]
async fn heartbeat_logs_error_when_api_is_unreachable() {
    // Bind-then-drop leaves a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let client = GraphqlClient::new(&format!("http://{addr}/graphql"), Duration::from_secs(1))
        .expect("client construction should not fail");

    let log = temp_log("heartbeat-down");
    let entry = run_heartbeat(&client, &log).await;

    assert!(entry.ends_with(" CRM is alive (GraphQL error)"), "{entry}");
    std::fs::remove_file(&log).ok();
}

// ---------------------------------------------------------------------------
// Restock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restock_logs_message_and_each_product() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("updateLowStockProducts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "updateLowStockProducts": {
                    "message": "Restocked 2 low-stock product(s)",
                    "updatedProducts": [
                        { "id": "3", "name": "Keyboard", "stock": 12 },
                        { "id": "7", "name": "Monitor", "stock": 10 }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(10));
    let log = temp_log("restock");
    let entry = run_restock(&client, &log).await;

    let contents = std::fs::read_to_string(&log).expect("log written");
    assert_eq!(contents, format!("{entry}\n"));

    let lines: Vec<&str> = entry.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("UpdateLowStockProducts: Restocked 2 low-stock product(s)"));
    assert_eq!(lines[1], "   - Keyboard → stock: 12");
    assert_eq!(lines[2], "   - Monitor → stock: 10");
    std::fs::remove_file(&log).ok();
}

#[tokio::test]
async fn restock_surfaces_graphql_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "database unavailable" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(10));
    match request_restock(&client).await {
        RestockOutcome::GraphqlErrors(errors) => {
            assert_eq!(errors[0]["message"], "database unavailable");
        }
        other => panic!("expected GraphqlErrors, got {other:?}"),
    }
}

#[tokio::test]
async fn restock_reports_unexpected_payload_as_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server, Duration::from_secs(10));
    let log = temp_log("restock-bad");
    let entry = run_restock(&client, &log).await;

    assert!(
        entry.contains("UpdateLowStockProducts: Request error: "),
        "{entry}"
    );
    std::fs::remove_file(&log).ok();
}
