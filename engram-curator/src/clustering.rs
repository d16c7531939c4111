//! Online cluster join and single-pass greedy batch clustering.

use std::collections::BTreeMap;

use tracing::{debug, info};

use engram_core::cluster::ClusterStatus;
use engram_core::constants::{AUTO_CLUSTER_BATCH_LIMIT, AUTO_CLUSTER_MIN_SIZE};
use engram_core::errors::EngramResult;
use engram_core::memory::MemoryRecord;
use engram_core::models::{ClusterDraft, ClusterJoin, ClusterPatch, RecordPatch};
use engram_core::text;
use engram_core::vector::{cosine_similarity, mean};

use crate::engine::Curator;

/// Knobs of one batch clustering pass.
#[derive(Debug, Clone)]
pub struct AutoClusterOptions {
    pub domain: Option<String>,
    pub min_confidence: f64,
    pub min_size: usize,
    pub threshold: f64,
    pub hours_back: Option<f64>,
}

impl Default for AutoClusterOptions {
    fn default() -> Self {
        Self {
            domain: None,
            min_confidence: 0.5,
            min_size: AUTO_CLUSTER_MIN_SIZE,
            threshold: engram_core::constants::CLUSTER_SIM_THRESHOLD,
            hours_back: None,
        }
    }
}

/// One cluster produced by a batch pass.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    pub cluster_id: i64,
    pub domain: String,
    pub theme: String,
    pub size: usize,
    pub status: ClusterStatus,
}

/// Attach a freshly saved record to the closest open cluster in its
/// domain, or seed a new singleton cluster when none qualifies. The
/// centroid is not re-averaged on a single join; the batch pass
/// rebuilds it.
pub(crate) fn try_join_cluster(
    curator: &Curator<'_>,
    record_id: i64,
    vector: &[f32],
    domain: &str,
    confidence: f64,
) -> EngramResult<Option<ClusterJoin>> {
    let open = curator
        .store
        .clusters_by_domain(domain, &[ClusterStatus::Growing, ClusterStatus::Mature])?;

    // Earliest id wins ties because the list is id-ordered and we only
    // replace on strictly greater similarity.
    let mut best: Option<(usize, f64)> = None;
    for (idx, cluster) in open.iter().enumerate() {
        let similarity = cosine_similarity(vector, &cluster.centroid);
        if similarity >= curator.cluster_config.similarity_threshold
            && best.map_or(true, |(_, s)| similarity > s)
        {
            best = Some((idx, similarity));
        }
    }

    let Some((idx, similarity)) = best else {
        debug!(record_id, domain, "no cluster above threshold, seeding one");
        return seed_cluster(curator, record_id, vector, domain, confidence).map(Some);
    };
    let cluster = &open[idx];

    curator.store.update_fields(
        record_id,
        &RecordPatch {
            cluster_id: Some(Some(cluster.id)),
            ..Default::default()
        },
    )?;

    let new_count = cluster.member_count + 1;
    let new_avg = (cluster.avg_confidence * cluster.member_count as f64 + confidence)
        / new_count as f64;
    let promoted = cluster.status == ClusterStatus::Growing
        && new_count as usize >= curator.cluster_config.maturity_count
        && new_avg >= curator.cluster_config.maturity_confidence;

    curator.store.update_cluster(
        cluster.id,
        &ClusterPatch {
            member_count: Some(new_count),
            avg_confidence: Some(new_avg),
            status: promoted.then_some(ClusterStatus::Mature),
            ..Default::default()
        },
    )?;

    if promoted {
        info!(cluster_id = cluster.id, members = new_count, "cluster matured");
    }
    Ok(Some(ClusterJoin {
        cluster_id: cluster.id,
        similarity,
        promoted,
        created: false,
    }))
}

/// Seed a singleton cluster around a record no existing cluster wants.
fn seed_cluster(
    curator: &Curator<'_>,
    record_id: i64,
    vector: &[f32],
    domain: &str,
    confidence: f64,
) -> EngramResult<ClusterJoin> {
    let theme = curator
        .store
        .get_record(record_id)?
        .map(|record| {
            let tokens = text::theme_tokens(&record.content, &curator.stopwords);
            if tokens.is_empty() {
                "general-pattern".to_string()
            } else {
                tokens.join("-")
            }
        })
        .unwrap_or_else(|| "general-pattern".to_string());

    let cluster_id = curator.store.insert_cluster(&ClusterDraft {
        theme,
        centroid: vector.to_vec(),
        member_count: 1,
        avg_confidence: confidence,
        domain: domain.to_string(),
        status: ClusterStatus::Growing,
    })?;
    curator.store.update_fields(
        record_id,
        &RecordPatch {
            cluster_id: Some(Some(cluster_id)),
            ..Default::default()
        },
    )?;

    info!(cluster_id, record_id, domain, "seeded new cluster");
    Ok(ClusterJoin {
        cluster_id,
        similarity: 1.0,
        promoted: false,
        created: true,
    })
}

impl<'a> Curator<'a> {
    /// Batch clustering over unclustered records: single-pass greedy
    /// seeding within each domain, keeping candidates of `min_size` or
    /// more, with mean centroids and inferred themes.
    pub fn auto_cluster(&self, options: &AutoClusterOptions) -> EngramResult<Vec<ClusterSummary>> {
        let candidates = self.store.unclustered_memories(
            options.min_confidence,
            options.hours_back,
            AUTO_CLUSTER_BATCH_LIMIT,
        )?;

        // Group by domain, preserving the confidence-descending order.
        let mut by_domain: BTreeMap<String, Vec<(MemoryRecord, Vec<f32>)>> = BTreeMap::new();
        for record in candidates {
            if let Some(filter) = &options.domain {
                if record.domain != *filter {
                    continue;
                }
            }
            // Only vectorized records can cluster.
            let Some(vector) = self.store.vector_by_id(record.id)? else {
                continue;
            };
            by_domain
                .entry(record.domain.clone())
                .or_default()
                .push((record, vector));
        }

        let mut summaries = Vec::new();
        for (domain, members) in by_domain {
            for group in greedy_groups(&members, options.threshold) {
                if group.len() < options.min_size {
                    continue;
                }
                summaries.push(self.build_cluster(&domain, &members, &group)?);
            }
        }
        Ok(summaries)
    }

    fn build_cluster(
        &self,
        domain: &str,
        members: &[(MemoryRecord, Vec<f32>)],
        group: &[usize],
    ) -> EngramResult<ClusterSummary> {
        let vectors: Vec<Vec<f32>> = group.iter().map(|&i| members[i].1.clone()).collect();
        let centroid = mean(&vectors);
        let avg_confidence = group
            .iter()
            .map(|&i| members[i].0.confidence.value())
            .sum::<f64>()
            / group.len() as f64;

        let status = if group.len() >= self.cluster_config.maturity_count
            && avg_confidence >= self.cluster_config.maturity_confidence
        {
            ClusterStatus::Mature
        } else {
            ClusterStatus::Growing
        };

        let combined_content: String = group
            .iter()
            .map(|&i| members[i].0.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let theme_tokens = text::theme_tokens(&combined_content, &self.stopwords);
        let theme = if theme_tokens.is_empty() {
            "general-pattern".to_string()
        } else {
            theme_tokens.join("-")
        };

        let cluster_id = self.store.insert_cluster(&ClusterDraft {
            theme: theme.clone(),
            centroid,
            member_count: group.len() as u64,
            avg_confidence,
            domain: domain.to_string(),
            status,
        })?;

        for &i in group {
            self.store.update_fields(
                members[i].0.id,
                &RecordPatch {
                    cluster_id: Some(Some(cluster_id)),
                    ..Default::default()
                },
            )?;
        }

        info!(cluster_id, domain, theme = %theme, size = group.len(), "batch cluster created");
        Ok(ClusterSummary {
            cluster_id,
            domain: domain.to_string(),
            theme,
            size: group.len(),
            status,
        })
    }
}

/// Single-pass greedy grouping: each unassigned record in input order
/// seeds a candidate and absorbs every later unassigned record whose
/// similarity to the seed meets the threshold.
fn greedy_groups(members: &[(MemoryRecord, Vec<f32>)], threshold: f64) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; members.len()];
    let mut groups = Vec::new();

    for seed in 0..members.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut group = vec![seed];
        for other in (seed + 1)..members.len() {
            if assigned[other] {
                continue;
            }
            if cosine_similarity(&members[seed].1, &members[other].1) >= threshold {
                assigned[other] = true;
                group.push(other);
            }
        }
        groups.push(group);
    }
    groups
}
