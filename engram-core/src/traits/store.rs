use crate::cluster::{Cluster, ClusterStatus};
use crate::errors::EngramResult;
use crate::memory::{MemoryRecord, MemoryType};
use crate::models::{ClusterDraft, ClusterPatch, MemoryStats, RecordDraft, RecordPatch};

/// The full storage surface: transactional primitives plus the read-only
/// helpers the retriever and curator are built on. Each mutation runs in
/// a single transaction; on failure no partial state remains.
pub trait MemoryStore: Send + Sync {
    // --- Records ---
    fn insert_record(&self, draft: &RecordDraft) -> EngramResult<i64>;
    fn get_record(&self, id: i64) -> EngramResult<Option<MemoryRecord>>;
    fn update_fields(&self, id: i64, patch: &RecordPatch) -> EngramResult<()>;
    fn delete_record(&self, id: i64) -> EngramResult<()>;

    // --- Vectors ---
    /// Insert or replace the vector entry keyed by the record id.
    /// Fails (and rolls back) when no such record exists.
    fn insert_vector(&self, record_id: i64, embedding: &[f32]) -> EngramResult<()>;
    fn delete_vector(&self, record_id: i64) -> EngramResult<()>;
    fn vector_by_id(&self, record_id: i64) -> EngramResult<Option<Vec<f32>>>;

    // --- Clusters ---
    fn insert_cluster(&self, draft: &ClusterDraft) -> EngramResult<i64>;
    fn get_cluster(&self, id: i64) -> EngramResult<Option<Cluster>>;
    fn update_cluster(&self, id: i64, patch: &ClusterPatch) -> EngramResult<()>;
    fn clusters_by_domain(
        &self,
        domain: &str,
        statuses: &[ClusterStatus],
    ) -> EngramResult<Vec<Cluster>>;
    fn cluster_members(&self, cluster_id: i64) -> EngramResult<Vec<MemoryRecord>>;

    // --- Query helpers ---
    /// The newest `limit` records of a (type, domain) bucket, newest first.
    fn recent_by_type_domain(
        &self,
        memory_type: MemoryType,
        domain: &str,
        limit: usize,
    ) -> EngramResult<Vec<MemoryRecord>>;
    /// Unclustered records ordered by confidence descending, optionally
    /// restricted to the trailing `hours_back` window.
    fn unclustered_memories(
        &self,
        min_confidence: f64,
        hours_back: Option<f64>,
        limit: usize,
    ) -> EngramResult<Vec<MemoryRecord>>;
    /// Records with no vector entry, oldest first (for offline rebuild
    /// after an embedder outage).
    fn vectorless_records(&self, limit: usize) -> EngramResult<Vec<MemoryRecord>>;

    // --- Search ---
    /// Lexical search; returns up to k `(record, score)` by descending
    /// BM25/ngram score.
    fn full_text_search(&self, query: &str, k: usize) -> EngramResult<Vec<(MemoryRecord, f64)>>;
    /// Dense search; returns up to k `(record_id, cosine_distance)`
    /// ascending, distance in [0, 2].
    fn vector_search(&self, embedding: &[f32], k: usize) -> EngramResult<Vec<(i64, f64)>>;

    // --- Aggregation ---
    fn stats(&self) -> EngramResult<MemoryStats>;
}
