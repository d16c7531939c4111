use async_trait::async_trait;

use crate::errors::EngramResult;
use crate::memory::MemoryType;
use crate::models::{ExtractedMemory, StructurizeVerdict};

/// Structuring gateway to the external LLM sidecar. All operations are
/// deadline-bounded; failures surface as `GatewayError` and callers apply
/// the documented fallbacks (vectorless save, concatenation merge, skip).
#[async_trait]
pub trait Structurer: Send + Sync {
    /// Convert free text into the typed XML record for `memory_type`,
    /// or reject it as not worth persisting.
    async fn structurize(
        &self,
        text: &str,
        memory_type: MemoryType,
    ) -> EngramResult<StructurizeVerdict>;

    /// Produce one XML record subsuming all inputs for a pattern-typed
    /// aggregate in `domain`.
    async fn merge(&self, xmls: &[String], domain: &str) -> EngramResult<String>;

    /// Extract at most three records worth persisting from a transcript.
    async fn extract(&self, transcript: &str) -> EngramResult<Vec<ExtractedMemory>>;
}
