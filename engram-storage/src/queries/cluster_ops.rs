//! Cluster table operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use engram_core::cluster::{Cluster, ClusterStatus};
use engram_core::errors::EngramResult;
use engram_core::models::{ClusterDraft, ClusterPatch};

use super::vector_ops::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::time;
use crate::to_storage_err;

const CLUSTER_COLUMNS: &str =
    "id, theme, centroid, member_count, avg_confidence, domain, status, created_at, updated_at, evolved_at";

pub fn insert_cluster(conn: &Connection, draft: &ClusterDraft) -> EngramResult<i64> {
    let now = time::now_str();
    conn.execute(
        "INSERT INTO clusters (theme, centroid, member_count, avg_confidence, domain, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            draft.theme,
            f32_vec_to_bytes(&draft.centroid),
            draft.member_count as i64,
            draft.avg_confidence,
            draft.domain,
            draft.status.as_str(),
            now,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_cluster(conn: &Connection, id: i64) -> EngramResult<Option<Cluster>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {CLUSTER_COLUMNS} FROM clusters WHERE id = ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.query_row(params![id], |row| Ok(parse_cluster_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .transpose()
}

pub fn update_cluster(conn: &Connection, id: i64, patch: &ClusterPatch) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("update_cluster begin: {e}")))?;

    match update_cluster_inner(&tx, id, patch) {
        Ok(()) => tx
            .commit()
            .map_err(|e| to_storage_err(format!("update_cluster commit: {e}"))),
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn update_cluster_inner(conn: &Connection, id: i64, patch: &ClusterPatch) -> EngramResult<()> {
    let now = time::now_str();
    let changed = conn
        .execute(
            "UPDATE clusters SET updated_at = ?2 WHERE id = ?1",
            params![id, now],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(engram_core::errors::StorageError::ClusterNotFound { id }.into());
    }

    if let Some(member_count) = patch.member_count {
        conn.execute(
            "UPDATE clusters SET member_count = ?2 WHERE id = ?1",
            params![id, member_count as i64],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(avg_confidence) = patch.avg_confidence {
        conn.execute(
            "UPDATE clusters SET avg_confidence = ?2 WHERE id = ?1",
            params![id, avg_confidence],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(status) = patch.status {
        conn.execute(
            "UPDATE clusters SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(centroid) = &patch.centroid {
        conn.execute(
            "UPDATE clusters SET centroid = ?2 WHERE id = ?1",
            params![id, f32_vec_to_bytes(centroid)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(theme) = &patch.theme {
        conn.execute(
            "UPDATE clusters SET theme = ?2 WHERE id = ?1",
            params![id, theme],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(evolved_at) = patch.evolved_at {
        conn.execute(
            "UPDATE clusters SET evolved_at = ?2 WHERE id = ?1",
            params![id, time::to_str(evolved_at)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

/// Clusters in a domain restricted to the given statuses, earliest first
/// (the online join breaks similarity ties by earliest id).
pub fn clusters_by_domain(
    conn: &Connection,
    domain: &str,
    statuses: &[ClusterStatus],
) -> EngramResult<Vec<Cluster>> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = statuses
        .iter()
        .enumerate()
        .map(|(i, _)| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {CLUSTER_COLUMNS} FROM clusters
         WHERE domain = ?1 AND status IN ({placeholders})
         ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(domain.to_string())];
    for status in statuses {
        params_vec.push(Box::new(status.as_str().to_string()));
    }
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let rows = stmt
        .query_map(params_refs.as_slice(), |row| Ok(parse_cluster_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut clusters = Vec::new();
    for row in rows {
        clusters.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(clusters)
}

fn parse_cluster_row(row: &Row<'_>) -> EngramResult<Cluster> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());

    let centroid_blob: Vec<u8> = row.get(2).map_err(read)?;
    let status_str: String = row.get(6).map_err(read)?;
    let status: ClusterStatus = status_str.parse().map_err(|e: String| to_storage_err(e))?;

    let created_at: String = row.get(7).map_err(read)?;
    let updated_at: String = row.get(8).map_err(read)?;
    let evolved_at: Option<String> = row.get(9).map_err(read)?;

    Ok(Cluster {
        id: row.get(0).map_err(read)?,
        theme: row.get(1).map_err(read)?,
        centroid: bytes_to_f32_vec(&centroid_blob),
        member_count: row.get::<_, i64>(3).map_err(read)? as u64,
        avg_confidence: row.get(4).map_err(read)?,
        domain: row.get(5).map_err(read)?,
        status,
        created_at: time::parse(&created_at)?,
        updated_at: time::parse(&updated_at)?,
        evolved_at: time::parse_opt(evolved_at)?,
    })
}
