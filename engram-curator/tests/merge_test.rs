//! Cluster merge: aggregate creation, member deletion, fallback path.

use engram_core::cluster::ClusterStatus;
use engram_core::config::ClusterConfig;
use engram_core::memory::MemoryType;
use engram_core::text::Stopwords;
use engram_core::traits::{build_embedding_input, MemoryStore};
use engram_curator::{Curator, SaveOptions};
use engram_storage::StorageEngine;
use test_fixtures::{blended_vec, MockEmbedder, MockStructurer};

/// Save five mutually similar records in `devops` so one mature cluster
/// exists; returns (cluster_id, member_ids).
async fn seed_mature_cluster(
    curator: &Curator<'_>,
    embedder: &MockEmbedder,
    store: &StorageEngine,
) -> (i64, Vec<i64>) {
    let contents: Vec<String> = (0..5)
        .map(|i| format!("roll deploys back fast variant {i}"))
        .collect();
    for (i, content) in contents.iter().enumerate() {
        embedder.preset(
            &build_embedding_input(content, "devops"),
            blended_vec(0, i + 1, 0.95),
        );
        curator
            .save(
                content,
                SaveOptions {
                    memory_type: MemoryType::Pattern,
                    domain: "devops".to_string(),
                    confidence: 0.7,
                    skip_structurize: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let clusters = store
        .clusters_by_domain("devops", &[ClusterStatus::Mature])
        .unwrap();
    assert_eq!(clusters.len(), 1);
    let members: Vec<i64> = store
        .cluster_members(clusters[0].id)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    (clusters[0].id, members)
}

#[tokio::test]
async fn merge_replaces_members_with_one_aggregate() {
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

    let (cluster_id, members) = seed_mature_cluster(&curator, &embedder, &store).await;
    assert_eq!(members.len(), 5);

    let outcome = curator.merge_cluster(cluster_id).await.unwrap();
    assert_eq!(outcome.merged_members, 5);
    assert!(!outcome.used_fallback);
    assert_eq!(structurer.merge_call_count(), 1);

    // One new aggregate record: merged confidence, provenance, promotion.
    let aggregate = store.get_record(outcome.new_record_id).unwrap().unwrap();
    assert_eq!(aggregate.source, "cluster-merge");
    assert_eq!(aggregate.confidence.value(), 0.9);
    assert_eq!(aggregate.domain, "devops");
    assert_eq!(aggregate.memory_type, MemoryType::Pattern);
    assert!(aggregate.promoted_at.is_some());
    assert!(aggregate.structured.is_some());

    // All members are gone, along with their index entries.
    for id in &members {
        assert!(store.get_record(*id).unwrap().is_none());
        assert!(store.vector_by_id(*id).unwrap().is_none());
    }
    assert!(store.cluster_members(cluster_id).unwrap().is_empty());

    // The cluster is closed out.
    let cluster = store.get_cluster(cluster_id).unwrap().unwrap();
    assert_eq!(cluster.status, ClusterStatus::Merged);
    assert!(cluster.evolved_at.is_some());

    // Searching member text now surfaces the aggregate, not the originals.
    let hits = store.full_text_search("merged records", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, outcome.new_record_id);

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_memories, 1);
    assert_eq!(stats.promoted_count, 1);
    assert_eq!(stats.clusters_by_status.get("merged"), Some(&1));
}

#[tokio::test]
async fn llm_outage_falls_back_to_concatenation() {
    let store = StorageEngine::open_in_memory().unwrap();
    let embedder = MockEmbedder::new();
    let seeder = MockStructurer::passthrough();
    let seeding_curator = Curator::new(
        &store,
        &embedder,
        &seeder,
        ClusterConfig::default(),
        Stopwords::default(),
    );
    let (cluster_id, _members) = seed_mature_cluster(&seeding_curator, &embedder, &store).await;

    let failing = MockStructurer::failing();
    let curator = Curator::new(
        &store,
        &embedder,
        &failing,
        ClusterConfig::default(),
        Stopwords::default(),
    );

    let outcome = curator.merge_cluster(cluster_id).await.unwrap();
    assert!(outcome.used_fallback);

    let aggregate = store.get_record(outcome.new_record_id).unwrap().unwrap();
    assert_eq!(aggregate.confidence.value(), 0.85);
    assert!(aggregate.structured.is_none());
    assert_eq!(aggregate.content.matches("\n---\n").count(), 4);

    let cluster = store.get_cluster(cluster_id).unwrap().unwrap();
    assert_eq!(cluster.status, ClusterStatus::Merged);
}

#[tokio::test]
async fn growing_clusters_are_not_mergeable() {
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

    // Two similar saves: a growing cluster of two.
    for (i, content) in ["tail the logs first", "tail the logs always"].iter().enumerate() {
        embedder.preset(
            &build_embedding_input(content, "devops"),
            blended_vec(0, i + 1, 0.95),
        );
        curator
            .save(
                content,
                SaveOptions {
                    memory_type: MemoryType::Pattern,
                    domain: "devops".to_string(),
                    confidence: 0.7,
                    skip_structurize: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let clusters = store
        .clusters_by_domain("devops", &[ClusterStatus::Growing])
        .unwrap();
    assert_eq!(clusters.len(), 1);
    assert!(curator.merge_cluster(clusters[0].id).await.is_err());
}

#[tokio::test]
async fn missing_cluster_is_an_error() {
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
    assert!(curator.merge_cluster(999).await.is_err());
}
