//! Curator: the save pipeline and confidence bookkeeping.

use tracing::{debug, info, warn};

use engram_core::config::ClusterConfig;
use engram_core::constants::{
    DEDUP_CONFIDENCE_BUMP, DEDUP_SIMILARITY, DEDUP_WINDOW, VALIDATE_PENALTY, VALIDATE_REWARD,
};
use engram_core::errors::{CuratorError, EngramResult, StorageError};
use engram_core::memory::{Confidence, MemoryRecord, MemoryType};
use engram_core::models::{MemoryStats, RecordDraft, RecordPatch, SaveOutcome, StructurizeVerdict};
use engram_core::text::{self, Stopwords};
use engram_core::traits::{build_embedding_input, Embedder, MemoryStore, Structurer};

use crate::clustering;

/// Caller-facing knobs of one save call.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub memory_type: MemoryType,
    pub domain: String,
    pub tags: Vec<String>,
    pub confidence: f64,
    pub source: String,
    /// Persist the raw text without calling the structurer.
    pub skip_structurize: bool,
    /// Already-structured XML (e.g. from transcript extraction); used
    /// verbatim, the structurer is not called.
    pub pre_structured: Option<String>,
    /// Leave the record unclustered even when a vector was stored.
    pub suppress_clustering: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            memory_type: MemoryType::default(),
            domain: "general".to_string(),
            tags: Vec::new(),
            confidence: Confidence::DEFAULT,
            source: "user".to_string(),
            skip_structurize: false,
            pre_structured: None,
            suppress_clustering: false,
        }
    }
}

/// The write-side engine. Borrows the store and both gateways.
pub struct Curator<'a> {
    pub(crate) store: &'a dyn MemoryStore,
    pub(crate) embedder: &'a dyn Embedder,
    pub(crate) structurer: &'a dyn Structurer,
    pub(crate) cluster_config: ClusterConfig,
    pub(crate) stopwords: Stopwords,
}

impl<'a> Curator<'a> {
    pub fn new(
        store: &'a dyn MemoryStore,
        embedder: &'a dyn Embedder,
        structurer: &'a dyn Structurer,
        cluster_config: ClusterConfig,
        stopwords: Stopwords,
    ) -> Self {
        Self {
            store,
            embedder,
            structurer,
            cluster_config,
            stopwords,
        }
    }

    /// The save pipeline: dedup window → structurize → insert → embed →
    /// cluster join. Duplicate and reject are ordinary outcomes.
    pub async fn save(&self, content: &str, options: SaveOptions) -> EngramResult<SaveOutcome> {
        if content.trim().is_empty() {
            return Err(CuratorError::EmptyContent.into());
        }

        // 1. Dedup against the recent window of the same (type, domain).
        if let Some(outcome) = self.dedup_check(content, &options)? {
            return Ok(outcome);
        }

        // 2. Obtain the structured form.
        let structured = match self.obtain_structured(content, &options).await? {
            Ok(structured) => structured,
            Err(reason) => return Ok(SaveOutcome::Rejected { reason }),
        };

        // 3. Insert the record.
        let draft = RecordDraft {
            content: content.to_string(),
            structured: structured.clone(),
            summary: text::summarize(content),
            keywords: text::keywords(content, &self.stopwords),
            tags: options.tags.clone(),
            memory_type: options.memory_type,
            domain: options.domain.clone(),
            confidence: Confidence::new(options.confidence),
            source: options.source.clone(),
            content_hash: MemoryRecord::compute_content_hash(content),
            promoted_at: None,
        };
        let id = self.store.insert_record(&draft)?;

        // 4. Embed and store the vector; save proceeds without one on
        // gateway failure.
        let body = structured.as_deref().unwrap_or(content);
        let input = build_embedding_input(body, &options.domain);
        let vector = self.embedder.embed(&input).await;
        let mut cluster = None;
        match vector {
            Some(vector) => {
                self.store.insert_vector(id, &vector)?;
                // 5. Online cluster join.
                if !options.suppress_clustering {
                    cluster = clustering::try_join_cluster(
                        self,
                        id,
                        &vector,
                        &options.domain,
                        draft.confidence.value(),
                    )?;
                }
            }
            None => {
                debug!(id, "no embedding obtained, record is lexical-only");
            }
        }

        info!(id, memory_type = %options.memory_type, domain = %options.domain, "saved record");
        Ok(SaveOutcome::Created { id, cluster })
    }

    /// Scan the last 10 records of the bucket for a near-identical text.
    /// A hit revalidates that record instead of inserting a new one.
    fn dedup_check(
        &self,
        content: &str,
        options: &SaveOptions,
    ) -> EngramResult<Option<SaveOutcome>> {
        let content_hash = MemoryRecord::compute_content_hash(content);
        let recent =
            self.store
                .recent_by_type_domain(options.memory_type, &options.domain, DEDUP_WINDOW)?;

        for record in recent {
            let similarity = if record.content_hash == content_hash {
                1.0
            } else {
                text::jaccard(content, &record.content)
            };
            if similarity < DEDUP_SIMILARITY {
                continue;
            }

            self.store.update_fields(
                record.id,
                &RecordPatch {
                    confidence: Some(record.confidence.adjusted(DEDUP_CONFIDENCE_BUMP)),
                    touch_access: true,
                    ..Default::default()
                },
            )?;
            debug!(id = record.id, similarity, "duplicate save revalidated record");
            return Ok(Some(SaveOutcome::Updated {
                id: record.id,
                similarity,
            }));
        }
        Ok(None)
    }

    /// Resolve the structured field: pre-structured wins, skip leaves it
    /// blank, otherwise ask the structurer. A gateway failure degrades
    /// to an unstructured save; a reject verdict aborts the save.
    async fn obtain_structured(
        &self,
        content: &str,
        options: &SaveOptions,
    ) -> EngramResult<Result<Option<String>, String>> {
        if let Some(pre) = &options.pre_structured {
            return Ok(Ok(Some(pre.clone())));
        }
        if options.skip_structurize {
            return Ok(Ok(None));
        }
        match self.structurer.structurize(content, options.memory_type).await {
            Ok(StructurizeVerdict::Structured(xml)) => Ok(Ok(Some(xml))),
            Ok(StructurizeVerdict::Rejected { reason }) => Ok(Err(reason)),
            Err(e) => {
                warn!(error = %e, "structurer unavailable, saving unstructured");
                Ok(Ok(None))
            }
        }
    }

    /// Apply a validation event: `+0.1` on confirm, `−0.05` on refute,
    /// clamped; the evidence counter is monotonic.
    pub fn validate(&self, id: i64, is_valid: bool) -> EngramResult<()> {
        let record = self
            .store
            .get_record(id)?
            .ok_or(StorageError::RecordNotFound { id })?;
        let delta = if is_valid {
            VALIDATE_REWARD
        } else {
            -VALIDATE_PENALTY
        };
        self.store.update_fields(
            id,
            &RecordPatch {
                confidence: Some(record.confidence.adjusted(delta)),
                evidence_delta: 1,
                ..Default::default()
            },
        )
    }

    /// Stamp usage on a batch of records. Missing ids are skipped.
    pub fn mark_used(&self, ids: &[i64]) -> EngramResult<()> {
        for &id in ids {
            if self.store.get_record(id)?.is_none() {
                warn!(id, "mark_used skipping missing record");
                continue;
            }
            self.store.update_fields(
                id,
                &RecordPatch {
                    touch_access: true,
                    ..Default::default()
                },
            )?;
        }
        Ok(())
    }

    /// Confidence boost used by positive feedback paths; also counts as
    /// a use.
    pub fn auto_boost(&self, id: i64, delta: f64) -> EngramResult<()> {
        let record = self
            .store
            .get_record(id)?
            .ok_or(StorageError::RecordNotFound { id })?;
        self.store.update_fields(
            id,
            &RecordPatch {
                confidence: Some(record.confidence.adjusted(delta)),
                touch_access: true,
                ..Default::default()
            },
        )
    }

    /// Engine-wide totals.
    pub fn stats(&self) -> EngramResult<MemoryStats> {
        self.store.stats()
    }

    /// Re-embed records that have no vector entry (saved during an
    /// embedder outage). Returns how many vectors were stored; records
    /// the service still cannot embed are left for the next pass.
    pub async fn rebuild_vectors(&self, limit: usize) -> EngramResult<usize> {
        let pending = self.store.vectorless_records(limit)?;
        let mut rebuilt = 0;
        for record in pending {
            let input = build_embedding_input(record.body(), &record.domain);
            if let Some(vector) = self.embedder.embed(&input).await {
                self.store.insert_vector(record.id, &vector)?;
                rebuilt += 1;
            }
        }
        if rebuilt > 0 {
            info!(rebuilt, "vector rebuild pass complete");
        }
        Ok(rebuilt)
    }

    /// Extract records from a session transcript and save each with its
    /// extracted structure, skipping duplicates through the normal path.
    pub async fn ingest_transcript(&self, transcript: &str) -> EngramResult<Vec<SaveOutcome>> {
        let extracted = self.structurer.extract(transcript).await?;
        let mut outcomes = Vec::with_capacity(extracted.len());
        for memory in extracted {
            let outcome = self
                .save(
                    &memory.summary,
                    SaveOptions {
                        memory_type: memory.memory_type,
                        domain: memory.domain.clone(),
                        confidence: memory.confidence,
                        source: "compact-analyzer".to_string(),
                        pre_structured: memory.structured.clone(),
                        skip_structurize: memory.structured.is_none(),
                        ..Default::default()
                    },
                )
                .await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
