//! The loopback search service: line-delimited JSON over TCP.
//!
//! One request line in, one response line out. Every response carries
//! `success`; failures come back as `{success:false, error}` without
//! dropping the connection. `shutdown` answers, then stops the accept
//! loop.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use engram_core::models::SearchFilters;

use crate::engine::MemoryEngine;

/// Accept connections until a `shutdown` request arrives.
pub async fn serve(engine: Arc<MemoryEngine>, listener: TcpListener) -> std::io::Result<()> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    info!(addr = %listener.local_addr()?, "memory service listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutdown requested, stopping accept loop");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                debug!(%peer, "connection accepted");
                let engine = engine.clone();
                let shutdown = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(engine, stream, shutdown).await {
                        warn!(error = %e, "connection ended with error");
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    engine: Arc<MemoryEngine>,
    stream: TcpStream,
    shutdown: Arc<watch::Sender<bool>>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, stop) = match serde_json::from_str::<Value>(trimmed) {
            Ok(request) => dispatch(&engine, &request).await,
            Err(e) => (
                json!({"success": false, "error": format!("bad request: {e}")}),
                false,
            ),
        };

        let mut out = response.to_string();
        out.push('\n');
        write_half.write_all(out.as_bytes()).await?;

        if stop {
            let _ = shutdown.send(true);
            return Ok(());
        }
    }
}

/// Route one request. The second element is true when the server should
/// stop accepting.
async fn dispatch(engine: &MemoryEngine, request: &Value) -> (Value, bool) {
    let action = request["action"].as_str().unwrap_or("");
    match action {
        "search" => (search(engine, request, false).await, false),
        "quickSearch" => (search(engine, request, true).await, false),
        "ping" => (
            json!({"success": true, "ready": engine.ready().await}),
            false,
        ),
        "stats" => match engine.stats() {
            Ok(stats) => (
                json!({"success": true, "stats": serde_json::to_value(stats).unwrap_or_default()}),
                false,
            ),
            Err(e) => (json!({"success": false, "error": e.to_string()}), false),
        },
        "shutdown" => (json!({"success": true}), true),
        other => (
            json!({"success": false, "error": format!("unknown action: {other}")}),
            false,
        ),
    }
}

async fn search(engine: &MemoryEngine, request: &Value, quick: bool) -> Value {
    let Some(query) = request["query"].as_str() else {
        return json!({"success": false, "error": "missing query"});
    };
    let limit = request["limit"]
        .as_u64()
        .map(|l| l as usize)
        .unwrap_or_else(|| engine.default_limit());
    let filters = request
        .get("options")
        .and_then(|v| serde_json::from_value::<SearchFilters>(v.clone()).ok())
        .unwrap_or_default();

    let result = if quick {
        engine.quick_search(query, limit, &filters)
    } else {
        engine.search(query, limit, &filters).await
    };

    match result {
        Ok(hits) => {
            json!({"success": true, "results": serde_json::to_value(hits).unwrap_or_default()})
        }
        Err(e) => json!({"success": false, "error": e.to_string()}),
    }
}
