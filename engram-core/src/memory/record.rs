use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::types::MemoryType;

/// One persistent memory. Mirrors the `memories` table row for row;
/// timestamps are stored as RFC3339 text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Monotonic integer primary key.
    pub id: i64,
    /// Original text, never empty.
    pub content: String,
    /// Structured XML form, absent when structuring was skipped.
    pub structured: Option<String>,
    /// Leading prefix of `content`, at most 100 characters plus `...`.
    pub summary: String,
    /// Comma-joined top-10 content tokens by frequency.
    pub keywords: String,
    /// Caller-supplied tags.
    pub tags: Vec<String>,
    pub memory_type: MemoryType,
    /// Short lowercase grouping tag, `general` by default.
    pub domain: String,
    pub confidence: Confidence,
    /// Validation events applied, monotonic.
    pub evidence_count: u64,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Owning cluster, if the record has joined one.
    pub cluster_id: Option<i64>,
    /// Provenance tag: `user`, `mcp-tool`, `compact-analyzer`, `cluster-merge`, ….
    pub source: String,
    /// blake3 hex of `content`, used as the exact-duplicate fast path.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub promoted_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// Compute the blake3 content hash for a content string.
    pub fn compute_content_hash(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// The text embedded and returned as `content` in search results:
    /// the structured form when present, the raw content otherwise.
    pub fn body(&self) -> &str {
        self.structured.as_deref().unwrap_or(&self.content)
    }
}

impl PartialEq for MemoryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
