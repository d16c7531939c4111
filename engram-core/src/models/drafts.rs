use chrono::{DateTime, Utc};

use crate::cluster::ClusterStatus;
use crate::memory::{Confidence, MemoryType};

/// Everything the store needs to insert a record. Timestamps,
/// access/evidence counters, and the id are assigned by the store.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub content: String,
    pub structured: Option<String>,
    pub summary: String,
    pub keywords: String,
    pub tags: Vec<String>,
    pub memory_type: MemoryType,
    pub domain: String,
    pub confidence: Confidence,
    pub source: String,
    pub content_hash: String,
    /// Set on aggregate records produced by a cluster merge.
    pub promoted_at: Option<DateTime<Utc>>,
}

/// Partial record update. `None` fields are left untouched;
/// `updated_at` is always refreshed. Confidence values are clamped
/// before they reach the database.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub confidence: Option<Confidence>,
    /// Added to `evidence_count`.
    pub evidence_delta: u64,
    /// Increment `access_count` and stamp `last_accessed_at = now`.
    pub touch_access: bool,
    /// `Some(None)` detaches the record from its cluster.
    pub cluster_id: Option<Option<i64>>,
}

/// Everything the store needs to insert a cluster.
#[derive(Debug, Clone)]
pub struct ClusterDraft {
    pub theme: String,
    pub centroid: Vec<f32>,
    pub member_count: u64,
    pub avg_confidence: f64,
    pub domain: String,
    pub status: ClusterStatus,
}

/// Partial cluster update; `updated_at` is always refreshed.
#[derive(Debug, Clone, Default)]
pub struct ClusterPatch {
    pub member_count: Option<u64>,
    pub avg_confidence: Option<f64>,
    pub status: Option<ClusterStatus>,
    pub centroid: Option<Vec<f32>>,
    pub theme: Option<String>,
    pub evolved_at: Option<DateTime<Utc>>,
}
