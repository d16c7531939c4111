//! Wire-protocol test: a real server on an ephemeral port, a line-JSON
//! client, both model services absent (the engine degrades to lexical).

use std::sync::Arc;

use engram::{serve, MemoryEngine};
use engram_core::config::EngramConfig;
use engram_curator::SaveOptions;
use engram_core::memory::MemoryType;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Engine with unreachable gateways: saves are unstructured and
/// vectorless, search is lexical-only. That is exactly the degraded mode
/// the protocol must keep serving.
fn offline_config() -> EngramConfig {
    let mut config = EngramConfig::default();
    config.embedder.port = 1;
    config.embedder.timeout_ms = 50;
    config.embedder.query_timeout_ms = 50;
    config.llm.port = 1;
    config.llm.timeout_ms = 50;
    config.llm.structurize_timeout_ms = 50;
    config
}

async fn start_server() -> (Arc<MemoryEngine>, u16) {
    let engine = Arc::new(MemoryEngine::open_in_memory(offline_config()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let serving = engine.clone();
    tokio::spawn(async move {
        let _ = serve(serving, listener).await;
    });
    (engine, port)
}

struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    async fn connect(port: u16) -> Self {
        let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn request(&mut self, request: Value) -> Value {
        let mut line = request.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
        let mut response = String::new();
        self.reader.read_line(&mut response).await.unwrap();
        serde_json::from_str(response.trim()).unwrap()
    }
}

#[tokio::test]
async fn ping_answers_with_degraded_readiness() {
    let (_engine, port) = start_server().await;
    let mut client = Client::connect(port).await;

    let response = client.request(json!({"action": "ping"})).await;
    assert_eq!(response["success"], true);
    assert_eq!(response["ready"], false, "embedder is unreachable");
}

#[tokio::test]
async fn quick_search_returns_saved_records_in_wire_shape() {
    let (engine, port) = start_server().await;
    engine
        .save(
            "retry with exponential backoff",
            SaveOptions {
                memory_type: MemoryType::Pattern,
                domain: "backend".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut client = Client::connect(port).await;
    let response = client
        .request(json!({"action": "quickSearch", "query": "backoff", "limit": 5}))
        .await;

    assert_eq!(response["success"], true);
    let results = response["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    let hit = &results[0];
    assert_eq!(hit["rawContent"], "retry with exponential backoff");
    assert_eq!(hit["type"], "pattern");
    assert_eq!(hit["domain"], "backend");
    assert!(hit["bm25Score"].as_f64().unwrap() > 0.0);
    assert_eq!(hit["vectorSimilarity"].as_f64().unwrap(), 0.0);
    assert!(hit.get("combinedScore").is_some());
    assert!(hit.get("createdAt").is_some());
    assert!(hit.get("date").is_some());
}

#[tokio::test]
async fn search_applies_option_filters() {
    let (engine, port) = start_server().await;
    for (content, domain) in [
        ("backoff in backend", "backend"),
        ("backoff in frontend", "frontend"),
    ] {
        engine
            .save(
                content,
                SaveOptions {
                    memory_type: MemoryType::Pattern,
                    domain: domain.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let mut client = Client::connect(port).await;
    let response = client
        .request(json!({
            "action": "search",
            "query": "backoff",
            "limit": 10,
            "options": {"domain": "backend"}
        }))
        .await;

    assert_eq!(response["success"], true);
    let results = response["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["domain"], "backend");
}

#[tokio::test]
async fn stats_reports_totals() {
    let (engine, port) = start_server().await;
    engine
        .save("a counted note", SaveOptions::default())
        .await
        .unwrap();

    let mut client = Client::connect(port).await;
    let response = client.request(json!({"action": "stats"})).await;
    assert_eq!(response["success"], true);
    assert_eq!(response["stats"]["totalMemories"], 1);
}

#[tokio::test]
async fn unknown_action_is_an_error_without_dropping_the_connection() {
    let (_engine, port) = start_server().await;
    let mut client = Client::connect(port).await;

    let response = client.request(json!({"action": "explode"})).await;
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().contains("unknown action"));

    // The same connection still serves the next request.
    let ping = client.request(json!({"action": "ping"})).await;
    assert_eq!(ping["success"], true);
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let (_engine, port) = start_server().await;
    let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let (read_half, mut writer) = stream.into_split();
    writer.write_all(b"not json at all\n").await.unwrap();

    let mut response = String::new();
    BufReader::new(read_half).read_line(&mut response).await.unwrap();
    let parsed: Value = serde_json::from_str(response.trim()).unwrap();
    assert_eq!(parsed["success"], false);
}

#[tokio::test]
async fn shutdown_stops_the_accept_loop() {
    let (_engine, port) = start_server().await;
    let mut client = Client::connect(port).await;

    let response = client.request(json!({"action": "shutdown"})).await;
    assert_eq!(response["success"], true);

    // Give the accept loop a moment to wind down, then new connections
    // must fail.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
}
