//! Vector entry invariants and the brute-force distance scan.

use engram_core::constants::EMBEDDING_DIMENSIONS;
use engram_core::memory::{Confidence, MemoryRecord, MemoryType};
use engram_core::models::RecordDraft;
use engram_core::traits::MemoryStore;
use engram_storage::StorageEngine;

fn save(engine: &StorageEngine, content: &str) -> i64 {
    let draft = RecordDraft {
        content: content.to_string(),
        structured: None,
        summary: content.to_string(),
        keywords: String::new(),
        tags: Vec::new(),
        memory_type: MemoryType::Fact,
        domain: "general".to_string(),
        confidence: Confidence::new(0.5),
        source: "user".to_string(),
        content_hash: MemoryRecord::compute_content_hash(content),
        promoted_at: None,
    };
    engine.insert_record(&draft).unwrap()
}

/// A unit vector with energy concentrated on one axis pair, so different
/// seeds are far apart and equal seeds are identical.
fn unit_vec(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
    v[seed % EMBEDDING_DIMENSIONS] = 0.8;
    v[(seed + 1) % EMBEDDING_DIMENSIONS] = 0.6;
    v
}

#[test]
fn insert_and_fetch_round_trip() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = save(&engine, "vectorized");
    engine.insert_vector(id, &unit_vec(3)).unwrap();

    let stored = engine.vector_by_id(id).unwrap().unwrap();
    assert_eq!(stored.len(), EMBEDDING_DIMENSIONS);
    assert_eq!(stored[3], 0.8);
}

#[test]
fn vector_for_missing_record_is_an_integrity_failure() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let err = engine.insert_vector(424242, &unit_vec(0));
    assert!(err.is_err());
}

#[test]
fn wrong_dimension_is_rejected() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = save(&engine, "wrong dims");
    assert!(engine.insert_vector(id, &[1.0, 0.0]).is_err());
    assert!(engine.vector_by_id(id).unwrap().is_none());
}

#[test]
fn search_orders_by_distance_ascending() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let near = save(&engine, "near");
    let far = save(&engine, "far");
    engine.insert_vector(near, &unit_vec(0)).unwrap();
    engine.insert_vector(far, &unit_vec(500)).unwrap();

    let results = engine.vector_search(&unit_vec(0), 10).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, near);
    assert!(results[0].1 < 1e-6, "identical vector has ~zero distance");
    assert!(results[1].1 > results[0].1);
    assert!((0.0..=2.0).contains(&results[1].1));
}

#[test]
fn vectorless_record_never_appears_in_vector_results() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let with_vec = save(&engine, "indexed both ways");
    let without_vec = save(&engine, "lexical only");
    engine.insert_vector(with_vec, &unit_vec(7)).unwrap();

    let results = engine.vector_search(&unit_vec(7), 10).unwrap();
    let ids: Vec<i64> = results.iter().map(|(id, _)| *id).collect();
    assert!(ids.contains(&with_vec));
    assert!(!ids.contains(&without_vec));
}

#[test]
fn deleting_the_record_cascades_to_the_vector() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = save(&engine, "cascade");
    engine.insert_vector(id, &unit_vec(1)).unwrap();

    engine.delete_record(id).unwrap();
    assert!(engine.vector_by_id(id).unwrap().is_none());
    assert!(engine.vector_search(&unit_vec(1), 10).unwrap().is_empty());
}

#[test]
fn reinsert_replaces_the_entry() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = save(&engine, "replaced");
    engine.insert_vector(id, &unit_vec(1)).unwrap();
    engine.insert_vector(id, &unit_vec(9)).unwrap();

    let stored = engine.vector_by_id(id).unwrap().unwrap();
    assert_eq!(stored[9], 0.8);
    assert_eq!(stored[1], 0.0);
}
