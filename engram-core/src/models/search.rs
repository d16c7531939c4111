use serde::{Deserialize, Serialize};

use crate::memory::{MemoryRecord, MemoryType};

/// Optional narrowing applied after rank merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(rename = "minConfidence")]
    pub min_confidence: Option<f64>,
    #[serde(rename = "type")]
    pub memory_type: Option<MemoryType>,
    pub domain: Option<String>,
}

/// One ranked search result, in the wire shape the loopback service
/// returns. `content` carries the structured form when present; the
/// original text is always available under `rawContent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i64,
    pub content: String,
    pub raw_content: String,
    pub structured_content: Option<String>,
    pub summary: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub domain: String,
    pub confidence: f64,
    pub tags: Vec<String>,
    pub created_at: String,
    /// Date portion of `created_at` (YYYY-MM-DD).
    pub date: String,
    pub bm25_score: f64,
    pub vector_similarity: f64,
    pub vector_distance: f64,
    pub combined_score: f64,
}

impl SearchHit {
    /// Build a hit from a record and its per-path scores.
    pub fn from_record(
        record: &MemoryRecord,
        bm25_score: f64,
        vector_similarity: f64,
        combined_score: f64,
    ) -> Self {
        let created_at = record.created_at.to_rfc3339();
        let date = record.created_at.format("%Y-%m-%d").to_string();
        Self {
            id: record.id,
            content: record.body().to_string(),
            raw_content: record.content.clone(),
            structured_content: record.structured.clone(),
            summary: record.summary.clone(),
            memory_type: record.memory_type,
            domain: record.domain.clone(),
            confidence: record.confidence.value(),
            tags: record.tags.clone(),
            created_at,
            date,
            bm25_score,
            vector_similarity,
            vector_distance: 1.0 - vector_similarity,
            combined_score,
        }
    }
}
