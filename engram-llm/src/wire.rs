//! One-shot line-JSON exchange with a loopback service.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use engram_core::errors::GatewayError;

/// Connect, send one JSON line, read one JSON line. The deadline covers
/// the whole exchange including the connect.
pub(crate) async fn round_trip(
    addr: &str,
    request: &Value,
    budget_ms: u64,
    operation: &str,
) -> Result<Value, GatewayError> {
    let exchange = async {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| GatewayError::Unavailable {
                reason: format!("connect {addr}: {e}"),
            })?;
        let (read_half, mut write_half) = stream.into_split();

        let mut line = serde_json::to_string(request).map_err(|e| GatewayError::Protocol {
            detail: format!("encode request: {e}"),
        })?;
        line.push('\n');
        write_half
            .write_all(line.as_bytes())
            .await
            .map_err(|e| GatewayError::Unavailable {
                reason: format!("write: {e}"),
            })?;

        let mut reader = BufReader::new(read_half);
        let mut response_line = String::new();
        let read = reader
            .read_line(&mut response_line)
            .await
            .map_err(|e| GatewayError::Unavailable {
                reason: format!("read: {e}"),
            })?;
        if read == 0 {
            return Err(GatewayError::Unavailable {
                reason: "connection closed before response".to_string(),
            });
        }

        serde_json::from_str(response_line.trim()).map_err(|e| GatewayError::Protocol {
            detail: format!("decode response: {e}"),
        })
    };

    match timeout(Duration::from_millis(budget_ms), exchange).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout {
            operation: operation.to_string(),
            budget_ms,
        }),
    }
}
