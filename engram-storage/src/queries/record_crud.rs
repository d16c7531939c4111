//! Insert, get, patch, delete for memory records.

use rusqlite::{params, Connection, OptionalExtension, Row};

use engram_core::errors::EngramResult;
use engram_core::memory::{Confidence, MemoryRecord, MemoryType};
use engram_core::models::{RecordDraft, RecordPatch};

use crate::time;
use crate::to_storage_err;

pub const RECORD_COLUMNS: &str = "id, content, structured, summary, keywords, tags, memory_type, \
     domain, confidence, evidence_count, access_count, last_accessed_at, cluster_id, source, \
     content_hash, created_at, updated_at, promoted_at";

/// Insert a single record. One transaction; the FTS entry is written by
/// the insert trigger inside the same transaction.
pub fn insert_record(conn: &Connection, draft: &RecordDraft) -> EngramResult<i64> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_record begin: {e}")))?;

    let id = match insert_record_inner(&tx, draft) {
        Ok(id) => id,
        Err(e) => {
            let _ = tx.rollback();
            return Err(e);
        }
    };
    tx.commit()
        .map_err(|e| to_storage_err(format!("insert_record commit: {e}")))?;
    Ok(id)
}

fn insert_record_inner(conn: &Connection, draft: &RecordDraft) -> EngramResult<i64> {
    let now = time::now_str();
    conn.execute(
        "INSERT INTO memories (
            content, structured, summary, keywords, tags, memory_type, domain,
            confidence, source, content_hash, created_at, updated_at, promoted_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, ?12)",
        params![
            draft.content,
            draft.structured,
            draft.summary,
            draft.keywords,
            draft.tags.join(","),
            draft.memory_type.as_str(),
            draft.domain,
            draft.confidence.value(),
            draft.source,
            draft.content_hash,
            now,
            draft.promoted_at.map(time::to_str),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Get a single record by id.
pub fn get_record(conn: &Connection, id: i64) -> EngramResult<Option<MemoryRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM memories WHERE id = ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(parse_record_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    result.transpose()
}

/// Apply a partial update. One transaction; `updated_at` always refreshes.
pub fn update_fields(conn: &Connection, id: i64, patch: &RecordPatch) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("update_fields begin: {e}")))?;

    match update_fields_inner(&tx, id, patch) {
        Ok(()) => tx
            .commit()
            .map_err(|e| to_storage_err(format!("update_fields commit: {e}"))),
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn update_fields_inner(conn: &Connection, id: i64, patch: &RecordPatch) -> EngramResult<()> {
    let now = time::now_str();
    let changed = conn
        .execute(
            "UPDATE memories SET updated_at = ?2 WHERE id = ?1",
            params![id, now],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(engram_core::errors::StorageError::RecordNotFound { id }.into());
    }

    if let Some(confidence) = patch.confidence {
        conn.execute(
            "UPDATE memories SET confidence = ?2 WHERE id = ?1",
            params![id, confidence.value()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if patch.evidence_delta > 0 {
        conn.execute(
            "UPDATE memories SET evidence_count = evidence_count + ?2 WHERE id = ?1",
            params![id, patch.evidence_delta],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if patch.touch_access {
        conn.execute(
            "UPDATE memories SET access_count = access_count + 1, last_accessed_at = ?2 WHERE id = ?1",
            params![id, now],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(cluster_id) = patch.cluster_id {
        conn.execute(
            "UPDATE memories SET cluster_id = ?2 WHERE id = ?1",
            params![id, cluster_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

/// Delete a record. The FTS trigger and the vector cascade clean up the
/// index entries in the same transaction.
pub fn delete_record(conn: &Connection, id: i64) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("delete_record begin: {e}")))?;
    let result = tx
        .execute("DELETE FROM memories WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()));
    match result {
        Ok(_) => tx
            .commit()
            .map_err(|e| to_storage_err(format!("delete_record commit: {e}"))),
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Parse one `RECORD_COLUMNS` row into a `MemoryRecord`.
pub fn parse_record_row(row: &Row<'_>) -> EngramResult<MemoryRecord> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());

    let memory_type_str: String = row.get(6).map_err(read)?;
    let memory_type: MemoryType = memory_type_str
        .parse()
        .map_err(|e: String| to_storage_err(e))?;

    let tags_str: String = row.get(5).map_err(read)?;
    let tags = if tags_str.is_empty() {
        Vec::new()
    } else {
        tags_str.split(',').map(|t| t.to_string()).collect()
    };

    let last_accessed_at: Option<String> = row.get(11).map_err(read)?;
    let created_at: String = row.get(15).map_err(read)?;
    let updated_at: String = row.get(16).map_err(read)?;
    let promoted_at: Option<String> = row.get(17).map_err(read)?;

    Ok(MemoryRecord {
        id: row.get(0).map_err(read)?,
        content: row.get(1).map_err(read)?,
        structured: row.get(2).map_err(read)?,
        summary: row.get(3).map_err(read)?,
        keywords: row.get(4).map_err(read)?,
        tags,
        memory_type,
        domain: row.get(7).map_err(read)?,
        confidence: Confidence::new(row.get(8).map_err(read)?),
        evidence_count: row.get::<_, i64>(9).map_err(read)? as u64,
        access_count: row.get::<_, i64>(10).map_err(read)? as u64,
        last_accessed_at: crate::time::parse_opt(last_accessed_at)?,
        cluster_id: row.get(12).map_err(read)?,
        source: row.get(13).map_err(read)?,
        content_hash: row.get(14).map_err(read)?,
        created_at: crate::time::parse(&created_at)?,
        updated_at: crate::time::parse(&updated_at)?,
        promoted_at: crate::time::parse_opt(promoted_at)?,
    })
}
