//! StorageEngine — owns the ConnectionPool, implements `MemoryStore`,
//! runs migrations on open, routes reads to the pool or the writer.

use std::path::Path;

use engram_core::cluster::{Cluster, ClusterStatus};
use engram_core::errors::EngramResult;
use engram_core::memory::{MemoryRecord, MemoryType};
use engram_core::models::{ClusterDraft, ClusterPatch, MemoryStats, RecordDraft, RecordPatch};
use engram_core::text::Stopwords;
use engram_core::traits::MemoryStore;

use crate::migrations;
use crate::pool::ConnectionPool;

/// The main storage engine. Owns the connection pool and provides the
/// full `MemoryStore` surface.
pub struct StorageEngine {
    pool: ConnectionPool,
    stopwords: Stopwords,
    /// When true, use the read pool for read operations (file-backed
    /// mode). When false, route all reads through the writer (in-memory
    /// mode, where read pool connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> EngramResult<Self> {
        Self::open_with_stopwords(path, Stopwords::default())
    }

    /// Open with configured stopword sets.
    pub fn open_with_stopwords(path: &Path, stopwords: Stopwords) -> EngramResult<Self> {
        let pool = ConnectionPool::open(path, 4)?;
        let engine = Self {
            pool,
            stopwords,
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing). Routes all reads
    /// through the writer since in-memory read pool connections are
    /// isolated databases that can't see the writer's changes.
    pub fn open_in_memory() -> EngramResult<Self> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let engine = Self {
            pool,
            stopwords: Stopwords::default(),
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations.
    fn initialize(&self) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| migrations::run_migrations(conn))
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> EngramResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> EngramResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }
}

impl MemoryStore for StorageEngine {
    fn insert_record(&self, draft: &RecordDraft) -> EngramResult<i64> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::record_crud::insert_record(conn, draft))
    }

    fn get_record(&self, id: i64) -> EngramResult<Option<MemoryRecord>> {
        self.with_reader(|conn| crate::queries::record_crud::get_record(conn, id))
    }

    fn update_fields(&self, id: i64, patch: &RecordPatch) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::record_crud::update_fields(conn, id, patch))
    }

    fn delete_record(&self, id: i64) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::record_crud::delete_record(conn, id))
    }

    fn insert_vector(&self, record_id: i64, embedding: &[f32]) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::vector_ops::insert_vector(conn, record_id, embedding))
    }

    fn delete_vector(&self, record_id: i64) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::vector_ops::delete_vector(conn, record_id))
    }

    fn vector_by_id(&self, record_id: i64) -> EngramResult<Option<Vec<f32>>> {
        self.with_reader(|conn| crate::queries::vector_ops::vector_by_id(conn, record_id))
    }

    fn insert_cluster(&self, draft: &ClusterDraft) -> EngramResult<i64> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::cluster_ops::insert_cluster(conn, draft))
    }

    fn get_cluster(&self, id: i64) -> EngramResult<Option<Cluster>> {
        self.with_reader(|conn| crate::queries::cluster_ops::get_cluster(conn, id))
    }

    fn update_cluster(&self, id: i64, patch: &ClusterPatch) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| crate::queries::cluster_ops::update_cluster(conn, id, patch))
    }

    fn clusters_by_domain(
        &self,
        domain: &str,
        statuses: &[ClusterStatus],
    ) -> EngramResult<Vec<Cluster>> {
        self.with_reader(|conn| crate::queries::cluster_ops::clusters_by_domain(conn, domain, statuses))
    }

    fn cluster_members(&self, cluster_id: i64) -> EngramResult<Vec<MemoryRecord>> {
        self.with_reader(|conn| crate::queries::record_query::cluster_members(conn, cluster_id))
    }

    fn recent_by_type_domain(
        &self,
        memory_type: MemoryType,
        domain: &str,
        limit: usize,
    ) -> EngramResult<Vec<MemoryRecord>> {
        self.with_reader(|conn| {
            crate::queries::record_query::recent_by_type_domain(conn, memory_type, domain, limit)
        })
    }

    fn unclustered_memories(
        &self,
        min_confidence: f64,
        hours_back: Option<f64>,
        limit: usize,
    ) -> EngramResult<Vec<MemoryRecord>> {
        self.with_reader(|conn| {
            crate::queries::record_query::unclustered_memories(conn, min_confidence, hours_back, limit)
        })
    }

    fn vectorless_records(&self, limit: usize) -> EngramResult<Vec<MemoryRecord>> {
        self.with_reader(|conn| crate::queries::record_query::vectorless_records(conn, limit))
    }

    fn full_text_search(&self, query: &str, k: usize) -> EngramResult<Vec<(MemoryRecord, f64)>> {
        self.with_reader(|conn| {
            crate::queries::text_search::full_text_search(conn, query, k, &self.stopwords)
        })
    }

    fn vector_search(&self, embedding: &[f32], k: usize) -> EngramResult<Vec<(i64, f64)>> {
        self.with_reader(|conn| crate::queries::vector_ops::vector_search(conn, embedding, k))
    }

    fn stats(&self) -> EngramResult<MemoryStats> {
        self.with_reader(|conn| crate::queries::record_query::stats(conn))
    }
}
