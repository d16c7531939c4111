//! The embedder gateway client.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use engram_core::config::EmbedderConfig;
use engram_core::traits::Embedder;
use engram_core::vector::{l2_norm, normalize};

use crate::wire;

/// Norm deviation tolerated before renormalizing.
const NORM_TOLERANCE: f64 = 1e-3;

/// Gateway to the external embedding service. One request per call, no
/// connection reuse, no retry; the service holds the model and the
/// engine holds nothing.
pub struct EmbedderClient {
    addr: String,
    model_id: String,
    dimensions: usize,
    timeout_ms: u64,
    query_timeout_ms: u64,
}

impl EmbedderClient {
    pub fn new(config: &EmbedderConfig) -> Self {
        Self {
            addr: format!("{}:{}", config.host, config.port),
            model_id: config.model_id.clone(),
            dimensions: config.dimensions,
            timeout_ms: config.timeout_ms,
            query_timeout_ms: config.query_timeout_ms,
        }
    }

    /// Check the service answers a ping within the document deadline.
    pub async fn ping(&self) -> bool {
        matches!(
            wire::round_trip(&self.addr, &json!({"action": "ping"}), self.timeout_ms, "ping").await,
            Ok(response) if response["success"].as_bool().unwrap_or(false)
        )
    }

    async fn request_embedding(&self, text: &str, budget_ms: u64) -> Option<Vec<f32>> {
        let request = json!({
            "action": "embed",
            "text": text,
            "model": self.model_id,
        });

        let response = match wire::round_trip(&self.addr, &request, budget_ms, "embed").await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "embedding request failed");
                return None;
            }
        };

        if !response["success"].as_bool().unwrap_or(false) {
            warn!(
                error = response["error"].as_str().unwrap_or("unknown"),
                "embedding service reported failure"
            );
            return None;
        }

        let raw: Vec<f32> = match response["embedding"].as_array() {
            Some(values) => values
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect(),
            None => {
                warn!("embedding response missing vector");
                return None;
            }
        };

        self.validate(raw)
    }

    /// Enforce the fixed dimension and unit norm. A slightly-off norm is
    /// renormalized; a zero or wrong-sized vector is discarded.
    fn validate(&self, raw: Vec<f32>) -> Option<Vec<f32>> {
        if raw.len() != self.dimensions {
            warn!(got = raw.len(), want = self.dimensions, "embedding dimension mismatch");
            return None;
        }
        let norm = l2_norm(&raw);
        if norm == 0.0 {
            warn!("embedding service returned a zero vector");
            return None;
        }
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            debug!(norm, "renormalizing embedding");
            return Some(normalize(&raw));
        }
        Some(raw)
    }
}

#[async_trait]
impl Embedder for EmbedderClient {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.request_embedding(text, self.timeout_ms).await
    }

    async fn embed_query(&self, text: &str) -> Option<Vec<f32>> {
        self.request_embedding(text, self.query_timeout_ms).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
