use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cluster lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    /// Accepting members, below the maturity bar.
    Growing,
    /// Size and average confidence both met; eligible for merge.
    Mature,
    /// Collapsed into an aggregate record; owns no members.
    Merged,
}

impl ClusterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::Growing => "growing",
            ClusterStatus::Mature => "mature",
            ClusterStatus::Merged => "merged",
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "growing" => Ok(ClusterStatus::Growing),
            "mature" => Ok(ClusterStatus::Mature),
            "merged" => Ok(ClusterStatus::Merged),
            other => Err(format!("unknown cluster status: {other}")),
        }
    }
}

/// A group of semantically related records. The centroid is the
/// arithmetic mean of member embeddings at the time the cluster was built
/// or rebuilt; single online joins do not re-average it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: i64,
    /// Short token string describing the theme, e.g. `retry-backoff-jitter`.
    pub theme: String,
    /// Mean member embedding; not necessarily unit norm.
    pub centroid: Vec<f32>,
    pub member_count: u64,
    pub avg_confidence: f64,
    pub domain: String,
    pub status: ClusterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the cluster is merged into an aggregate record.
    pub evolved_at: Option<DateTime<Utc>>,
}

impl Cluster {
    /// Whether this cluster meets the maturity bar for the given thresholds.
    pub fn meets_maturity(&self, maturity_count: usize, maturity_confidence: f64) -> bool {
        self.member_count as usize >= maturity_count && self.avg_confidence >= maturity_confidence
    }
}
