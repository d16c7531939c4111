//! Hybrid ranking end-to-end against an in-memory store and the
//! deterministic mock embedder.

use engram_core::memory::{Confidence, MemoryType};
use engram_core::models::SearchFilters;
use engram_core::traits::{Embedder, MemoryStore};
use engram_retrieval::Retriever;
use engram_storage::StorageEngine;
use test_fixtures::{axis_vec, record_draft, MockEmbedder};

/// Insert a record and embed its content with the mock's hash embedding.
async fn seed(
    store: &StorageEngine,
    embedder: &MockEmbedder,
    content: &str,
    memory_type: MemoryType,
    domain: &str,
) -> i64 {
    let id = store
        .insert_record(&record_draft(content, memory_type, domain))
        .unwrap();
    if let Some(vector) = embedder.embed(content).await {
        store.insert_vector(id, &vector).unwrap();
    }
    id
}

#[tokio::test]
async fn hybrid_ranking_prefers_semantic_and_lexical_overlap() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();

    let x = seed(&store, &embedder, "retry with exponential backoff", MemoryType::Pattern, "backend").await;
    let y = seed(&store, &embedder, "use connection pool", MemoryType::Pattern, "backend").await;
    let z = seed(
        &store,
        &embedder,
        "exponential backoff jitter avoids thundering herd",
        MemoryType::Pattern,
        "backend",
    )
    .await;

    let retriever = Retriever::new(&store, &embedder);
    let hits = retriever
        .search("backoff retry", 3, &SearchFilters::default())
        .await
        .unwrap();

    let top_two: Vec<i64> = hits.iter().take(2).map(|h| h.id).collect();
    assert!(top_two.contains(&x), "X should rank in the top two");
    assert!(top_two.contains(&z), "Z should rank in the top two");
    if let Some(y_hit) = hits.iter().find(|h| h.id == y) {
        assert!(y_hit.combined_score <= hits[1].combined_score);
    }
}

#[tokio::test]
async fn scores_are_monotone_and_bounded_by_k() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    for i in 0..12 {
        seed(&store, &embedder, &format!("backoff note number {i}"), MemoryType::Fact, "general").await;
    }

    let retriever = Retriever::new(&store, &embedder);
    let hits = retriever
        .search("backoff", 5, &SearchFilters::default())
        .await
        .unwrap();

    assert!(hits.len() <= 5);
    for pair in hits.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }
}

#[tokio::test]
async fn vector_only_candidates_are_fetched_with_zero_bm25() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();

    // Content shares no token with the query; only the vectors agree.
    let id = store
        .insert_record(&record_draft("semantically close, lexically far", MemoryType::Fact, "general"))
        .unwrap();
    store.insert_vector(id, &axis_vec(42)).unwrap();
    embedder.preset("unrelated wording", axis_vec(42));

    let retriever = Retriever::new(&store, &embedder);
    let hits = retriever
        .search("unrelated wording", 5, &SearchFilters::default())
        .await
        .unwrap();

    let hit = hits.iter().find(|h| h.id == id).expect("vector path found it");
    assert_eq!(hit.bm25_score, 0.0);
    assert!(hit.vector_similarity > 0.99);
    assert!(hit.combined_score > 0.69);
}

#[tokio::test]
async fn filters_drop_confidence_type_and_domain_mismatches() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();

    let keep = seed(&store, &embedder, "backoff keeps this", MemoryType::Pattern, "backend").await;
    let wrong_domain = seed(&store, &embedder, "backoff wrong domain", MemoryType::Pattern, "frontend").await;
    let wrong_type = seed(&store, &embedder, "backoff wrong type", MemoryType::Fact, "backend").await;
    let low_conf = seed(&store, &embedder, "backoff low confidence", MemoryType::Pattern, "backend").await;
    store
        .update_fields(
            low_conf,
            &engram_core::models::RecordPatch {
                confidence: Some(Confidence::new(0.3)),
                ..Default::default()
            },
        )
        .unwrap();

    let retriever = Retriever::new(&store, &embedder);
    let filters = SearchFilters {
        min_confidence: Some(0.4),
        memory_type: Some(MemoryType::Pattern),
        domain: Some("backend".to_string()),
    };
    let hits = retriever.search("backoff", 10, &filters).await.unwrap();

    let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![keep]);
    assert!(!ids.contains(&wrong_domain));
    assert!(!ids.contains(&wrong_type));
}

#[tokio::test]
async fn embedder_outage_degrades_to_lexical_ranking() {
    let store = StorageEngine::open_in_memory().unwrap();
    let live = MockEmbedder::new();
    seed(&store, &live, "retry with exponential backoff", MemoryType::Pattern, "backend").await;

    let dead = MockEmbedder::unavailable();
    let retriever = Retriever::new(&store, &dead);
    let hits = retriever
        .search("backoff", 5, &SearchFilters::default())
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].vector_similarity, 0.0);
    assert!(hits[0].bm25_score > 0.0);
}

#[tokio::test]
async fn quick_search_never_touches_the_embedder() {
    let store = StorageEngine::open_in_memory().unwrap();
    let seeder = MockEmbedder::new();
    seed(&store, &seeder, "lexical only lookup", MemoryType::Fact, "general").await;

    let counter = MockEmbedder::new();
    let retriever = Retriever::new(&store, &counter);
    let hits = retriever
        .quick_search("lexical", 5, &SearchFilters::default())
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(counter.call_count(), 0);
}

#[tokio::test]
async fn empty_query_returns_nothing() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    seed(&store, &embedder, "anything", MemoryType::Fact, "general").await;

    let retriever = Retriever::new(&store, &embedder);
    assert!(retriever
        .search("", 5, &SearchFilters::default())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(embedder.call_count(), 1, "only the seeding call");
}

#[tokio::test]
async fn content_field_prefers_the_structured_form() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();

    let mut draft = record_draft("raw body text", MemoryType::Fact, "general");
    draft.structured = Some(
        "<memory type=\"fact\" domain=\"general\"><what>raw body text</what></memory>".to_string(),
    );
    store.insert_record(&draft).unwrap();

    let retriever = Retriever::new(&store, &embedder);
    let hits = retriever
        .quick_search("raw body", 5, &SearchFilters::default())
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert!(hits[0].content.starts_with("<memory"));
    assert_eq!(hits[0].raw_content, "raw body text");
}
