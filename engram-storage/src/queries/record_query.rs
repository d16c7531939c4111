//! Read-only record queries and aggregate stats.

use rusqlite::{params, Connection};

use chrono::{Duration, Utc};

use engram_core::errors::EngramResult;
use engram_core::memory::{MemoryRecord, MemoryType};
use engram_core::models::MemoryStats;

use super::record_crud::{parse_record_row, RECORD_COLUMNS};
use crate::time;
use crate::to_storage_err;

/// The newest `limit` records in a (type, domain) bucket, newest first.
pub fn recent_by_type_domain(
    conn: &Connection,
    memory_type: MemoryType,
    domain: &str,
    limit: usize,
) -> EngramResult<Vec<MemoryRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM memories
             WHERE memory_type = ?1 AND domain = ?2
             ORDER BY id DESC LIMIT ?3"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    collect_records(stmt.query_map(
        params![memory_type.as_str(), domain, limit as i64],
        |row| Ok(parse_record_row(row)),
    ))
}

/// Unclustered records above a confidence floor, ordered by confidence
/// descending, optionally restricted to the trailing time window.
pub fn unclustered_memories(
    conn: &Connection,
    min_confidence: f64,
    hours_back: Option<f64>,
    limit: usize,
) -> EngramResult<Vec<MemoryRecord>> {
    let cutoff = hours_back.map(|h| {
        time::to_str(Utc::now() - Duration::seconds((h * 3600.0) as i64))
    });

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM memories
             WHERE cluster_id IS NULL
               AND confidence >= ?1
               AND (?2 IS NULL OR created_at >= ?2)
             ORDER BY confidence DESC, id ASC
             LIMIT ?3"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    collect_records(stmt.query_map(params![min_confidence, cutoff, limit as i64], |row| {
        Ok(parse_record_row(row))
    }))
}

/// Records with no vector entry, oldest first.
pub fn vectorless_records(conn: &Connection, limit: usize) -> EngramResult<Vec<MemoryRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM memories
             WHERE id NOT IN (SELECT record_id FROM vectors)
             ORDER BY id ASC LIMIT ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    collect_records(stmt.query_map(params![limit as i64], |row| Ok(parse_record_row(row))))
}

/// All members of a cluster, in insertion order.
pub fn cluster_members(conn: &Connection, cluster_id: i64) -> EngramResult<Vec<MemoryRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM memories WHERE cluster_id = ?1 ORDER BY id ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    collect_records(stmt.query_map(params![cluster_id], |row| Ok(parse_record_row(row))))
}

/// Engine-wide totals.
pub fn stats(conn: &Connection) -> EngramResult<MemoryStats> {
    let mut out = MemoryStats::default();

    out.total_memories = conn
        .query_row("SELECT count(*) FROM memories", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| to_storage_err(e.to_string()))? as u64;

    group_count(conn, "SELECT memory_type, count(*) FROM memories GROUP BY memory_type", &mut out.by_type)?;
    group_count(conn, "SELECT domain, count(*) FROM memories GROUP BY domain", &mut out.by_domain)?;
    group_count(
        conn,
        "SELECT status, count(*) FROM clusters GROUP BY status",
        &mut out.clusters_by_status,
    )?;

    out.promoted_count = conn
        .query_row(
            "SELECT count(*) FROM memories WHERE promoted_at IS NOT NULL",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))? as u64;

    Ok(out)
}

fn group_count(
    conn: &Connection,
    sql: &str,
    into: &mut std::collections::BTreeMap<String, u64>,
) -> EngramResult<()> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    for row in rows {
        let (key, count) = row.map_err(|e| to_storage_err(e.to_string()))?;
        into.insert(key, count as u64);
    }
    Ok(())
}

pub(crate) fn collect_records<F>(
    rows: Result<rusqlite::MappedRows<'_, F>, rusqlite::Error>,
) -> EngramResult<Vec<MemoryRecord>>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<EngramResult<MemoryRecord>>,
{
    let rows = rows.map_err(|e| to_storage_err(e.to_string()))?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(records)
}
