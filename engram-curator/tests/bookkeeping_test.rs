//! Validation arithmetic, usage stamps, boosts, transcript ingestion.

use engram_core::config::ClusterConfig;
use engram_core::memory::MemoryType;
use engram_core::models::SaveOutcome;
use engram_core::text::Stopwords;
use engram_core::traits::MemoryStore;
use engram_curator::{Curator, SaveOptions};
use engram_storage::StorageEngine;
use test_fixtures::{MockEmbedder, MockStructurer};

async fn saved_record(curator: &Curator<'_>, content: &str, confidence: f64) -> i64 {
    let outcome = curator
        .save(
            content,
            SaveOptions {
                memory_type: MemoryType::Fact,
                domain: "general".to_string(),
                confidence,
                skip_structurize: true,
                suppress_clustering: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    match outcome {
        SaveOutcome::Created { id, .. } => id,
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_sequence_follows_the_documented_arithmetic() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::passthrough();
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let id = saved_record(&curator, "confidence walk", 0.6).await;

    // Two refutations: 0.6 − 0.05 − 0.05 = 0.5.
    curator.validate(id, false).unwrap();
    curator.validate(id, false).unwrap();
    let record = store.get_record(id).unwrap().unwrap();
    assert!((record.confidence.value() - 0.5).abs() < 1e-9);

    // Three confirmations: 0.5 + 0.3 = 0.8.
    for _ in 0..3 {
        curator.validate(id, true).unwrap();
    }
    let record = store.get_record(id).unwrap().unwrap();
    assert!((record.confidence.value() - 0.8).abs() < 1e-9);
    assert_eq!(record.evidence_count, 5);
}

#[tokio::test]
async fn confirm_then_refute_nets_five_hundredths() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::passthrough();
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let id = saved_record(&curator, "net movement", 0.5).await;
    curator.validate(id, true).unwrap();
    curator.validate(id, false).unwrap();

    let record = store.get_record(id).unwrap().unwrap();
    assert!((record.confidence.value() - 0.55).abs() < 1e-9);
    assert_eq!(record.evidence_count, 2);
}

#[tokio::test]
async fn confidence_clamps_at_both_bounds() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::passthrough();
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let id = saved_record(&curator, "clamped walk", 0.85).await;
    curator.validate(id, true).unwrap();
    assert_eq!(store.get_record(id).unwrap().unwrap().confidence.value(), 0.9);

    for _ in 0..20 {
        curator.validate(id, false).unwrap();
    }
    assert_eq!(store.get_record(id).unwrap().unwrap().confidence.value(), 0.3);
}

#[tokio::test]
async fn mark_used_stamps_access_and_skips_missing_ids() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::passthrough();
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let a = saved_record(&curator, "first used", 0.5).await;
    let b = saved_record(&curator, "second used", 0.5).await;

    curator.mark_used(&[a, 777, b]).unwrap();

    for id in [a, b] {
        let record = store.get_record(id).unwrap().unwrap();
        assert_eq!(record.access_count, 1);
        assert!(record.last_accessed_at.is_some());
    }
}

#[tokio::test]
async fn transcript_ingestion_saves_extracted_memories() {
    use engram_core::models::ExtractedMemory;

    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::extracting(vec![
        ExtractedMemory {
            memory_type: MemoryType::Learned,
            domain: "backend".to_string(),
            confidence: 0.7,
            summary: "prefers explicit migrations over ORM sync".to_string(),
            structured: Some(
                "<memory type=\"learned\" domain=\"backend\"><what>prefers explicit migrations</what></memory>"
                    .to_string(),
            ),
        },
        ExtractedMemory {
            memory_type: MemoryType::Decision,
            domain: "backend".to_string(),
            confidence: 0.6,
            summary: "chose postgres over mysql".to_string(),
            structured: None,
        },
    ]);
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let outcomes = curator.ingest_transcript("…long session…").await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| matches!(o, SaveOutcome::Created { .. })));

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_memories, 2);
    assert_eq!(stats.by_type.get("learned"), Some(&1));
    assert_eq!(stats.by_type.get("decision"), Some(&1));

    let first = store.get_record(1).unwrap().unwrap();
    assert_eq!(first.source, "compact-analyzer");
}

#[tokio::test]
async fn auto_boost_raises_confidence_and_counts_a_use() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let structurer = MockStructurer::passthrough();
    let curator = Curator::new(
        &store,
        &embedder,
        &structurer,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let id = saved_record(&curator, "boosted", 0.85).await;
    curator.auto_boost(id, 0.1).unwrap();

    let record = store.get_record(id).unwrap().unwrap();
    assert_eq!(record.confidence.value(), 0.9, "capped at the ceiling");
    assert_eq!(record.access_count, 1);
    assert_eq!(record.evidence_count, 0, "boost is not validation evidence");
}
