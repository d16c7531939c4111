//! MemoryEngine: one struct owning the store and both gateways, exposing
//! the four tool operations plus the maintenance entry points.

use tracing::info;

use engram_core::config::EngramConfig;
use engram_core::errors::EngramResult;
use engram_core::models::{MemoryStats, SaveOutcome, SearchFilters, SearchHit};
use engram_core::text::Stopwords;
use engram_core::traits::MemoryStore;
use engram_curator::{AutoClusterOptions, ClusterSummary, Curator, MergeOutcome, SaveOptions};
use engram_embeddings::EmbedderClient;
use engram_llm::StructurerClient;
use engram_retrieval::Retriever;
use engram_storage::StorageEngine;

pub struct MemoryEngine {
    store: StorageEngine,
    embedder: EmbedderClient,
    structurer: StructurerClient,
    stopwords: Stopwords,
    config: EngramConfig,
}

impl MemoryEngine {
    /// Open the engine against `memory.db` in the configured data
    /// directory, creating the directory when absent.
    pub fn open(config: EngramConfig) -> EngramResult<Self> {
        std::fs::create_dir_all(&config.paths.data_dir).map_err(|e| {
            engram_core::errors::ConfigError::Io {
                path: config.paths.data_dir.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let stopwords = Stopwords::with_extra(
            &config.text.extra_stopwords,
            &config.text.extra_cjk_stopwords,
        );
        let store = StorageEngine::open_with_stopwords(&config.db_path(), stopwords.clone())?;
        info!(db = %config.db_path().display(), "memory engine opened");
        Ok(Self::assemble(store, stopwords, config))
    }

    /// In-memory engine (for tests).
    pub fn open_in_memory(config: EngramConfig) -> EngramResult<Self> {
        let stopwords = Stopwords::with_extra(
            &config.text.extra_stopwords,
            &config.text.extra_cjk_stopwords,
        );
        let store = StorageEngine::open_in_memory()?;
        Ok(Self::assemble(store, stopwords, config))
    }

    fn assemble(store: StorageEngine, stopwords: Stopwords, config: EngramConfig) -> Self {
        let embedder = EmbedderClient::new(&config.embedder);
        let structurer = StructurerClient::new(&config.llm);
        Self {
            store,
            embedder,
            structurer,
            stopwords,
            config,
        }
    }

    fn retriever(&self) -> Retriever<'_> {
        Retriever::new(&self.store, &self.embedder)
    }

    fn curator(&self) -> Curator<'_> {
        Curator::new(
            &self.store,
            &self.embedder,
            &self.structurer,
            self.config.cluster.clone(),
            self.stopwords.clone(),
        )
    }

    /// The default result count for search calls that pass no limit.
    pub fn default_limit(&self) -> usize {
        self.config.search.max_results
    }

    /// Hybrid search (lexical + dense), marking returned records used.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> EngramResult<Vec<SearchHit>> {
        let hits = self.retriever().search(query, limit, filters).await?;
        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        self.curator().mark_used(&ids)?;
        Ok(hits)
    }

    /// Lexical-only search with zero model load; does not stamp usage.
    pub fn quick_search(
        &self,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> EngramResult<Vec<SearchHit>> {
        self.retriever().quick_search(query, limit, filters)
    }

    pub async fn save(&self, content: &str, options: SaveOptions) -> EngramResult<SaveOutcome> {
        self.curator().save(content, options).await
    }

    pub fn validate(&self, id: i64, is_valid: bool) -> EngramResult<()> {
        self.curator().validate(id, is_valid)
    }

    pub fn stats(&self) -> EngramResult<MemoryStats> {
        self.curator().stats()
    }

    pub fn mark_used(&self, ids: &[i64]) -> EngramResult<()> {
        self.curator().mark_used(ids)
    }

    pub fn auto_boost(&self, id: i64, delta: f64) -> EngramResult<()> {
        self.curator().auto_boost(id, delta)
    }

    pub fn auto_cluster(&self, options: &AutoClusterOptions) -> EngramResult<Vec<ClusterSummary>> {
        self.curator().auto_cluster(options)
    }

    pub async fn merge_cluster(&self, cluster_id: i64) -> EngramResult<MergeOutcome> {
        self.curator().merge_cluster(cluster_id).await
    }

    pub async fn ingest_transcript(&self, transcript: &str) -> EngramResult<Vec<SaveOutcome>> {
        self.curator().ingest_transcript(transcript).await
    }

    pub async fn rebuild_vectors(&self, limit: usize) -> EngramResult<usize> {
        self.curator().rebuild_vectors(limit).await
    }

    /// Readiness: the store is open and the embedding service answers.
    pub async fn ready(&self) -> bool {
        self.store().stats().is_ok() && self.embedder.ping().await
    }

    /// Direct store access for maintenance and tests.
    pub fn store(&self) -> &StorageEngine {
        &self.store
    }
}
