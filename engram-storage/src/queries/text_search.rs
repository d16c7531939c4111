//! Mixed-script lexical search.
//!
//! ASCII identifier tokens go to the FTS5 index as a disjunctive phrase
//! query scored by BM25. Contiguous CJK runs are expanded into bigrams
//! and trigrams (stopword-filtered) and substring-matched against
//! `content` and `structured` at 0.5 per matched n-gram. When neither
//! path hits, a whole-query substring match scores 0.3. Paths merge by
//! id keeping the maximum score.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use engram_core::constants::{CJK_NGRAM_SCORE, SUBSTRING_FALLBACK_SCORE};
use engram_core::errors::EngramResult;
use engram_core::memory::MemoryRecord;
use engram_core::text::{self, Stopwords};

use super::record_crud::get_record;
use crate::to_storage_err;

pub fn full_text_search(
    conn: &Connection,
    query: &str,
    k: usize,
    stopwords: &Stopwords,
) -> EngramResult<Vec<(MemoryRecord, f64)>> {
    if query.trim().is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let mut scores: HashMap<i64, f64> = HashMap::new();

    for (id, score) in fts_phrase_path(conn, query, k)? {
        merge_max(&mut scores, id, score);
    }
    for (id, score) in cjk_ngram_path(conn, query, stopwords)? {
        merge_max(&mut scores, id, score);
    }
    if scores.is_empty() {
        for id in substring_fallback(conn, query)? {
            merge_max(&mut scores, id, SUBSTRING_FALLBACK_SCORE);
        }
    }

    let mut ranked: Vec<(i64, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);

    let mut results = Vec::with_capacity(ranked.len());
    for (id, score) in ranked {
        if let Some(record) = get_record(conn, id)? {
            results.push((record, score));
        }
    }
    Ok(results)
}

fn merge_max(scores: &mut HashMap<i64, f64>, id: i64, score: f64) {
    let entry = scores.entry(id).or_insert(score);
    if score > *entry {
        *entry = score;
    }
}

/// ASCII tokens as a disjunctive FTS5 phrase query, scored by BM25
/// (negated so higher is better).
fn fts_phrase_path(conn: &Connection, query: &str, k: usize) -> EngramResult<Vec<(i64, f64)>> {
    let tokens = text::ascii_tokens(query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let match_expr = tokens
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ");

    let mut stmt = conn
        .prepare(
            "SELECT rowid, -bm25(memories_fts) FROM memories_fts
             WHERE memories_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![match_expr, k as i64], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, score) = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push((id, score.max(0.0)));
    }
    Ok(out)
}

/// CJK bigram/trigram substring scan over content and structured.
fn cjk_ngram_path(
    conn: &Connection,
    query: &str,
    stopwords: &Stopwords,
) -> EngramResult<Vec<(i64, f64)>> {
    let mut ngrams: Vec<String> = Vec::new();
    for run in text::cjk_runs(query) {
        for gram in text::cjk_ngrams(&run) {
            if !stopwords.is_cjk_stopword(&gram) && !ngrams.contains(&gram) {
                ngrams.push(gram);
            }
        }
    }
    if ngrams.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare("SELECT id, content, coalesce(structured, '') FROM memories")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, content, structured) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let matched = ngrams
            .iter()
            .filter(|g| content.contains(g.as_str()) || structured.contains(g.as_str()))
            .count();
        if matched > 0 {
            out.push((id, matched as f64 * CJK_NGRAM_SCORE));
        }
    }
    Ok(out)
}

/// Whole-query substring match, the last resort.
fn substring_fallback(conn: &Connection, query: &str) -> EngramResult<Vec<i64>> {
    let needle = query.trim();
    let mut stmt = conn
        .prepare(
            "SELECT id FROM memories
             WHERE instr(content, ?1) > 0
                OR instr(coalesce(structured, ''), ?1) > 0",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![needle], |row| row.get::<_, i64>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(out)
}
