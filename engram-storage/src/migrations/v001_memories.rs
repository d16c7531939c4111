//! v001: clusters, memories. Clusters first so the foreign key target
//! exists when memories is created.

use rusqlite::Connection;

use engram_core::errors::EngramResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> EngramResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS clusters (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            theme          TEXT NOT NULL,
            centroid       BLOB NOT NULL,
            member_count   INTEGER NOT NULL DEFAULT 0,
            avg_confidence REAL NOT NULL DEFAULT 0,
            domain         TEXT NOT NULL,
            status         TEXT NOT NULL DEFAULT 'growing',
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            evolved_at     TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_clusters_domain_status ON clusters(domain, status);

        CREATE TABLE IF NOT EXISTS memories (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            content          TEXT NOT NULL CHECK (length(content) > 0),
            structured       TEXT,
            summary          TEXT NOT NULL DEFAULT '',
            keywords         TEXT NOT NULL DEFAULT '',
            tags             TEXT NOT NULL DEFAULT '',
            memory_type      TEXT NOT NULL DEFAULT 'context',
            domain           TEXT NOT NULL DEFAULT 'general',
            confidence       REAL NOT NULL DEFAULT 0.5,
            evidence_count   INTEGER NOT NULL DEFAULT 0,
            access_count     INTEGER NOT NULL DEFAULT 0,
            last_accessed_at TEXT,
            cluster_id       INTEGER REFERENCES clusters(id) ON DELETE SET NULL,
            source           TEXT NOT NULL DEFAULT 'user',
            content_hash     TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            promoted_at      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_memories_type_domain ON memories(memory_type, domain, id);
        CREATE INDEX IF NOT EXISTS idx_memories_cluster ON memories(cluster_id);
        CREATE INDEX IF NOT EXISTS idx_memories_confidence ON memories(confidence);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
