//! The structurer gateway client.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use engram_core::config::LlmConfig;
use engram_core::constants::EXTRACT_LIMIT;
use engram_core::errors::{EngramResult, GatewayError};
use engram_core::memory::MemoryType;
use engram_core::models::{ExtractedMemory, StructurizeVerdict};
use engram_core::traits::Structurer;

use crate::wire;

/// Gateway to the LLM sidecar. Stateless; one request line per call.
pub struct StructurerClient {
    addr: String,
    timeout_ms: u64,
    structurize_timeout_ms: u64,
    merge_timeout_ms: u64,
    session_timeout_ms: u64,
}

impl StructurerClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            addr: format!("{}:{}", config.host, config.port),
            timeout_ms: config.timeout_ms,
            structurize_timeout_ms: config.structurize_timeout_ms,
            merge_timeout_ms: config.merge_timeout_ms,
            session_timeout_ms: config.session_timeout_ms,
        }
    }

    pub async fn ping(&self) -> bool {
        matches!(
            wire::round_trip(&self.addr, &json!({"action": "ping"}), self.timeout_ms, "ping").await,
            Ok(response) if response["success"].as_bool().unwrap_or(false)
        )
    }

    async fn request(
        &self,
        request: Value,
        budget_ms: u64,
        operation: &str,
    ) -> EngramResult<Value> {
        let response = wire::round_trip(&self.addr, &request, budget_ms, operation).await?;
        if response["success"] == Value::Bool(false) {
            return Err(GatewayError::Remote {
                message: response["error"]
                    .as_str()
                    .unwrap_or("unspecified failure")
                    .to_string(),
            }
            .into());
        }
        Ok(response)
    }
}

#[async_trait]
impl Structurer for StructurerClient {
    async fn structurize(
        &self,
        text: &str,
        memory_type: MemoryType,
    ) -> EngramResult<StructurizeVerdict> {
        let response = self
            .request(
                json!({
                    "action": "structurize",
                    "text": text,
                    "type": memory_type.as_str(),
                }),
                self.structurize_timeout_ms,
                "structurize",
            )
            .await?;

        match &response["structured"] {
            Value::String(xml) => Ok(StructurizeVerdict::Structured(xml.clone())),
            Value::Object(obj) if obj.get("__rejected") == Some(&Value::Bool(true)) => {
                Ok(StructurizeVerdict::Rejected {
                    reason: obj
                        .get("reason")
                        .and_then(|r| r.as_str())
                        .unwrap_or("low value")
                        .to_string(),
                })
            }
            other => Err(GatewayError::Protocol {
                detail: format!("unexpected structurize payload: {other}"),
            }
            .into()),
        }
    }

    async fn merge(&self, xmls: &[String], domain: &str) -> EngramResult<String> {
        let response = self
            .request(
                json!({
                    "action": "merge",
                    "memories": xmls,
                    "domain": domain,
                }),
                self.merge_timeout_ms,
                "merge",
            )
            .await?;

        response["merged"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                GatewayError::Protocol {
                    detail: "merge response missing merged record".to_string(),
                }
                .into()
            })
    }

    async fn extract(&self, transcript: &str) -> EngramResult<Vec<ExtractedMemory>> {
        let response = self
            .request(
                json!({
                    "action": "analyzeSession",
                    "transcript": transcript,
                }),
                self.session_timeout_ms,
                "analyzeSession",
            )
            .await?;

        // `NONE` (or an absent list) means nothing worth persisting.
        let Some(entries) = response["memories"].as_array() else {
            return Ok(Vec::new());
        };

        let mut extracted = Vec::new();
        for entry in entries.iter().take(EXTRACT_LIMIT) {
            let memory_type = entry["type"]
                .as_str()
                .and_then(|t| t.parse::<MemoryType>().ok())
                .unwrap_or_default();
            let Some(summary) = entry["summary"].as_str() else {
                warn!("extracted memory missing summary, skipping");
                continue;
            };
            extracted.push(ExtractedMemory {
                memory_type,
                domain: entry["domain"].as_str().unwrap_or("general").to_string(),
                confidence: entry["confidence"].as_f64().unwrap_or(0.5),
                summary: summary.to_string(),
                structured: entry["structuredContent"].as_str().map(|s| s.to_string()),
            });
        }
        Ok(extracted)
    }
}
