//! Vector entries: f32 little-endian blobs keyed by record id, searched
//! by a brute-force cosine scan.

use rusqlite::{params, Connection, OptionalExtension};

use engram_core::constants::EMBEDDING_DIMENSIONS;
use engram_core::errors::{EngramResult, StorageError};
use engram_core::vector::cosine_similarity;

use crate::to_storage_err;

/// Insert or replace the vector entry for a record. Fails when the
/// record does not exist (foreign key) or the dimension is wrong; either
/// way the transaction rolls back and no partial state remains.
pub fn insert_vector(conn: &Connection, record_id: i64, embedding: &[f32]) -> EngramResult<()> {
    if embedding.len() != EMBEDDING_DIMENSIONS {
        return Err(StorageError::DimensionMismatch {
            got: embedding.len(),
            want: EMBEDDING_DIMENSIONS,
        }
        .into());
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_vector begin: {e}")))?;

    let result = tx
        .execute(
            "INSERT INTO vectors (record_id, embedding, dims)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(record_id) DO UPDATE SET
                embedding = excluded.embedding,
                dims = excluded.dims",
            params![record_id, f32_vec_to_bytes(embedding), embedding.len() as i64],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Integrity {
                    details: format!("vector insert for missing record {record_id}"),
                }
                .into()
            }
            other => to_storage_err(other.to_string()),
        });

    match result {
        Ok(_) => tx
            .commit()
            .map_err(|e| to_storage_err(format!("insert_vector commit: {e}"))),
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

pub fn delete_vector(conn: &Connection, record_id: i64) -> EngramResult<()> {
    conn.execute("DELETE FROM vectors WHERE record_id = ?1", params![record_id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn vector_by_id(conn: &Connection, record_id: i64) -> EngramResult<Option<Vec<f32>>> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT embedding FROM vectors WHERE record_id = ?1",
            params![record_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(blob.map(|b| bytes_to_f32_vec(&b)))
}

/// Brute-force cosine-distance scan over all vector entries. Returns up
/// to `k` `(record_id, distance)` pairs, distance in [0, 2], ascending.
/// Rows with a mismatched dimension are skipped without deserializing.
pub fn vector_search(
    conn: &Connection,
    query: &[f32],
    k: usize,
) -> EngramResult<Vec<(i64, f64)>> {
    if query.iter().all(|x| *x == 0.0) || k == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare("SELECT record_id, embedding, dims FROM vectors")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored: Vec<(i64, f64)> = Vec::new();
    for row in rows {
        let (record_id, blob, dims) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if dims as usize != query.len() {
            continue;
        }
        let stored = bytes_to_f32_vec(&blob);
        let distance = 1.0 - cosine_similarity(query, &stored);
        scored.push((record_id, distance));
    }

    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    Ok(scored)
}

/// Convert f32 slice to bytes (little-endian).
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vec.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
