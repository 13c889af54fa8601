//! End-to-end tests against a real listener
//!
//! Each test binds the greeting server on an ephemeral port and talks to it
//! over HTTP with reqwest.

use std::net::SocketAddr;
use std::time::Duration;

use greeting_server::greeting_server;
use serde_json::{Value, json};
use session_router_http::ServerConfig;
use tokio::sync::oneshot;

struct TestServer {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(json_response: bool) -> Self {
        let config = ServerConfig {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            json_response,
            ..ServerConfig::default()
        };
        let server = greeting_server(config, Duration::from_millis(20));
        let listener = server.bind().await.expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(listener, async {
                    let _ = rx.await;
                })
                .await
                .expect("Server failed");
        });

        Self {
            url: format!("http://{}/mcp", addr),
            shutdown: Some(tx),
            handle,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}

fn initialize_body() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "e2e-client", "version": "1.0.0"}
        }
    })
}

fn call(id: i64, tool: &str, name: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": {"name": name}}
    })
}

async fn initialize(client: &reqwest::Client, url: &str) -> String {
    let response = client
        .post(url)
        .header("Accept", "application/json")
        .json(&initialize_body())
        .send()
        .await
        .expect("Failed to send initialize");
    assert_eq!(response.status(), 200);

    response
        .headers()
        .get("Mcp-Session-Id")
        .expect("Missing Mcp-Session-Id header")
        .to_str()
        .unwrap()
        .to_string()
}

fn parse_sse(text: &str) -> Vec<Value> {
    text.split("\n\n")
        .filter(|event| !event.trim().is_empty())
        .map(|event| {
            let data = event
                .lines()
                .find_map(|line| line.strip_prefix("data: "))
                .expect("SSE event without data");
            serde_json::from_str(data).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_initialize_returns_session_header() {
    let server = TestServer::start(false).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&server.url)
        .header("Accept", "application/json")
        .json(&initialize_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let session_id = response
        .headers()
        .get("Mcp-Session-Id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(uuid::Uuid::parse_str(&session_id).unwrap().get_version_num(), 4);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["serverInfo"]["name"], "json-response-streamable-http-server");
    assert_eq!(body["result"]["protocolVersion"], "2025-06-18");

    server.stop().await;
}

#[tokio::test]
async fn test_greet_on_existing_session() {
    let server = TestServer::start(false).await;
    let client = reqwest::Client::new();
    let session_id = initialize(&client, &server.url).await;

    let response = client
        .post(&server.url)
        .header("Accept", "application/json")
        .header("Mcp-Session-Id", &session_id)
        .json(&call(2, "greet", "Ada"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], 2);
    assert_eq!(body["result"]["content"][0]["text"], "Hello, Ada!");

    server.stop().await;
}

#[tokio::test]
async fn test_multi_greet_streams_notifications_then_result() {
    let server = TestServer::start(false).await;
    let client = reqwest::Client::new();
    let session_id = initialize(&client, &server.url).await;

    let response = client
        .post(&server.url)
        .header("Accept", "application/json, text/event-stream")
        .header("Mcp-Session-Id", &session_id)
        .json(&call(3, "multi-greet", "Ada"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/event-stream"
    );

    let events = parse_sse(&response.text().await.unwrap());
    let messages: Vec<(&str, &str)> = events[..3]
        .iter()
        .map(|e| {
            assert_eq!(e["method"], "notifications/message");
            (
                e["params"]["level"].as_str().unwrap(),
                e["params"]["data"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        messages,
        vec![
            ("debug", "Starting multi-greet for Ada"),
            ("info", "Sending first greeting to Ada"),
            ("info", "Sending second greeting to Ada"),
        ]
    );
    assert_eq!(events.len(), 4);
    assert_eq!(events[3]["id"], 3);
    assert_eq!(events[3]["result"]["content"][0]["text"], "Good morning, Ada!");

    server.stop().await;
}

#[tokio::test]
async fn test_json_response_mode_returns_only_result() {
    let server = TestServer::start(true).await;
    let client = reqwest::Client::new();
    let session_id = initialize(&client, &server.url).await;

    let response = client
        .post(&server.url)
        .header("Accept", "application/json, text/event-stream")
        .header("Mcp-Session-Id", &session_id)
        .json(&call(4, "multi-greet", "Ada"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["content"][0]["text"], "Good morning, Ada!");

    server.stop().await;
}

#[tokio::test]
async fn test_request_without_session_is_rejected() {
    let server = TestServer::start(false).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&server.url)
        .json(&call(1, "greet", "Ada"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "jsonrpc": "2.0",
            "error": {"code": -32000, "message": "Bad Request: No valid session ID provided"},
            "id": null
        })
    );

    server.stop().await;
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let server = TestServer::start(false).await;
    let client = reqwest::Client::new();

    let response = client.get(&server.url).send().await.unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers().get("Allow").unwrap(), "POST");

    server.stop().await;
}
