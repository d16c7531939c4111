use serde::{Deserialize, Serialize};

use crate::memory::MemoryType;

/// What a save call produced. Duplicate and reject are ordinary outcomes,
/// not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SaveOutcome {
    /// A new record was inserted.
    Created {
        id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster: Option<ClusterJoin>,
    },
    /// A near-identical recent record was revalidated instead.
    Updated { id: i64, similarity: f64 },
    /// The structurer judged the content not worth persisting.
    Rejected { reason: String },
}

/// Result of an online cluster join attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterJoin {
    pub cluster_id: i64,
    pub similarity: f64,
    /// True when this join promoted the cluster to mature.
    pub promoted: bool,
    /// True when no host cluster qualified and a new one was seeded.
    pub created: bool,
}

/// The structurer's verdict on a piece of free text.
#[derive(Debug, Clone, PartialEq)]
pub enum StructurizeVerdict {
    /// The typed XML record.
    Structured(String),
    /// Judged low value: one-off command, temporary request, session-local.
    Rejected { reason: String },
}

/// One record lifted out of a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedMemory {
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub domain: String,
    pub confidence: f64,
    pub summary: String,
    #[serde(rename = "structuredContent")]
    pub structured: Option<String>,
}
