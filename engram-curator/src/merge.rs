//! Cluster merge: collapse a mature cluster's members into one
//! aggregate record. The aggregate (and its vector) is inserted before
//! any member is deleted; member ids are gone afterwards and no
//! forwarding table is kept.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use engram_core::cluster::ClusterStatus;
use engram_core::constants::{MERGE_CONFIDENCE, MERGE_FALLBACK_CONFIDENCE};
use engram_core::errors::{CuratorError, EngramResult, StorageError};
use engram_core::memory::{Confidence, MemoryRecord, MemoryType};
use engram_core::models::{ClusterPatch, RecordDraft};
use engram_core::text;
use engram_core::traits::build_embedding_input;

use crate::engine::Curator;

/// What a merge produced.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub new_record_id: i64,
    pub merged_members: usize,
    /// True when the LLM was unavailable and the concatenation fallback
    /// was stored instead.
    pub used_fallback: bool,
}

impl<'a> Curator<'a> {
    /// Merge a mature cluster with at least two members.
    pub async fn merge_cluster(&self, cluster_id: i64) -> EngramResult<MergeOutcome> {
        let cluster = self
            .store
            .get_cluster(cluster_id)?
            .ok_or(StorageError::ClusterNotFound { id: cluster_id })?;

        if cluster.status != ClusterStatus::Mature {
            return Err(CuratorError::NotMergeable {
                id: cluster_id,
                reason: format!("status is {}", cluster.status),
            }
            .into());
        }

        let members = self.store.cluster_members(cluster_id)?;
        if members.len() < 2 {
            return Err(CuratorError::NotMergeable {
                id: cluster_id,
                reason: format!("only {} member(s)", members.len()),
            }
            .into());
        }

        let texts: Vec<String> = members.iter().map(|m| m.body().to_string()).collect();
        let memory_type = modal_type(&members);

        // LLM aggregation, falling back to plain concatenation.
        let (content, structured, confidence, used_fallback) =
            match self.structurer.merge(&texts, &cluster.domain).await {
                Ok(xml) => (xml.clone(), Some(xml), MERGE_CONFIDENCE, false),
                Err(e) => {
                    warn!(cluster_id, error = %e, "merge LLM unavailable, storing concatenation");
                    (
                        texts.join("\n---\n"),
                        None,
                        MERGE_FALLBACK_CONFIDENCE,
                        true,
                    )
                }
            };

        let draft = RecordDraft {
            summary: text::summarize(&content),
            keywords: text::keywords(&content, &self.stopwords),
            tags: Vec::new(),
            memory_type,
            domain: cluster.domain.clone(),
            confidence: Confidence::new(confidence),
            source: "cluster-merge".to_string(),
            content_hash: MemoryRecord::compute_content_hash(&content),
            promoted_at: Some(Utc::now()),
            content,
            structured,
        };
        let new_record_id = self.store.insert_record(&draft)?;

        let body = draft.structured.as_deref().unwrap_or(&draft.content);
        let input = build_embedding_input(body, &cluster.domain);
        if let Some(vector) = self.embedder.embed(&input).await {
            self.store.insert_vector(new_record_id, &vector)?;
        }

        // Members go away only after the aggregate is fully in place.
        for member in &members {
            self.store.delete_record(member.id)?;
        }

        self.store.update_cluster(
            cluster_id,
            &ClusterPatch {
                status: Some(ClusterStatus::Merged),
                evolved_at: Some(Utc::now()),
                ..Default::default()
            },
        )?;

        info!(
            cluster_id,
            new_record_id,
            members = members.len(),
            used_fallback,
            "cluster merged"
        );
        Ok(MergeOutcome {
            new_record_id,
            merged_members: members.len(),
            used_fallback,
        })
    }
}

/// The most common member type; ties go to the earliest member carrying
/// one of the tied types.
fn modal_type(members: &[MemoryRecord]) -> MemoryType {
    let mut counts: HashMap<MemoryType, usize> = HashMap::new();
    for member in members {
        *counts.entry(member.memory_type).or_insert(0) += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    members
        .iter()
        .map(|m| m.memory_type)
        .find(|t| counts[t] == best)
        .unwrap_or_default()
}
