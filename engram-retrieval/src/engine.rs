//! Retriever: candidate gathering → rank merge → filter → weighted score.

use std::collections::HashMap;

use tracing::debug;

use engram_core::constants::{BM25_NORMALIZATION, LEXICAL_WEIGHT, VECTOR_WEIGHT};
use engram_core::errors::EngramResult;
use engram_core::memory::MemoryRecord;
use engram_core::models::{SearchFilters, SearchHit};
use engram_core::traits::{Embedder, MemoryStore};

/// Per-candidate state before scoring.
struct Candidate {
    record: MemoryRecord,
    bm25: f64,
    vec_sim: f64,
}

/// The hybrid ranker. Borrows the store and the embedder gateway; holds
/// no state of its own.
pub struct Retriever<'a> {
    store: &'a dyn MemoryStore,
    embedder: &'a dyn Embedder,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a dyn MemoryStore, embedder: &'a dyn Embedder) -> Self {
        Self { store, embedder }
    }

    /// Full hybrid search. Falls back to lexical-only ranking when the
    /// query embedding cannot be obtained.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filters: &SearchFilters,
    ) -> EngramResult<Vec<SearchHit>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.lexical_candidates(query, k)?;

        match self.embedder.embed_query(query).await {
            Some(query_vec) => {
                for (id, distance) in self.store.vector_search(&query_vec, 2 * k)? {
                    let vec_sim = 1.0 - distance;
                    if let Some(candidate) = candidates.get_mut(&id) {
                        candidate.vec_sim = vec_sim;
                    } else if let Some(record) = self.store.get_record(id)? {
                        candidates.insert(
                            id,
                            Candidate {
                                record,
                                bm25: 0.0,
                                vec_sim,
                            },
                        );
                    }
                }
            }
            None => {
                debug!("query embedding unavailable, ranking lexical-only");
            }
        }

        Ok(rank(candidates, filters, k))
    }

    /// Lexical-only mode: no embedder call at all, ranked by BM25.
    pub fn quick_search(
        &self,
        query: &str,
        k: usize,
        filters: &SearchFilters,
    ) -> EngramResult<Vec<SearchHit>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.lexical_candidates(query, k)?;
        Ok(rank(candidates, filters, k))
    }

    fn lexical_candidates(&self, query: &str, k: usize) -> EngramResult<HashMap<i64, Candidate>> {
        let hits = self.store.full_text_search(query, 2 * k)?;
        debug!(candidates = hits.len(), "lexical path");
        Ok(hits
            .into_iter()
            .map(|(record, bm25)| {
                (
                    record.id,
                    Candidate {
                        record,
                        bm25,
                        vec_sim: 0.0,
                    },
                )
            })
            .collect())
    }
}

/// Filter, score, sort, truncate.
fn rank(candidates: HashMap<i64, Candidate>, filters: &SearchFilters, k: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = candidates
        .into_values()
        .filter(|c| passes(&c.record, filters))
        .map(|c| {
            let combined = VECTOR_WEIGHT * c.vec_sim
                + LEXICAL_WEIGHT * (c.bm25 / BM25_NORMALIZATION).min(1.0);
            SearchHit::from_record(&c.record, c.bm25, c.vec_sim, combined)
        })
        .collect();

    hits.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(k);
    hits
}

fn passes(record: &MemoryRecord, filters: &SearchFilters) -> bool {
    if let Some(min) = filters.min_confidence {
        if record.confidence.value() < min {
            return false;
        }
    }
    if let Some(memory_type) = filters.memory_type {
        if record.memory_type != memory_type {
            return false;
        }
    }
    if let Some(domain) = &filters.domain {
        if record.domain != *domain {
            return false;
        }
    }
    true
}
