use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Engine-wide totals returned by the stats operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_memories: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_domain: BTreeMap<String, u64>,
    /// Cluster counts keyed by status (`growing`, `mature`, `merged`).
    pub clusters_by_status: BTreeMap<String, u64>,
    /// Records carrying a `promoted_at` timestamp.
    pub promoted_count: u64,
}
