//! Cluster table operations and member queries.

use engram_core::cluster::ClusterStatus;
use engram_core::constants::EMBEDDING_DIMENSIONS;
use engram_core::memory::{Confidence, MemoryRecord, MemoryType};
use engram_core::models::{ClusterDraft, ClusterPatch, RecordDraft, RecordPatch};
use engram_core::traits::MemoryStore;
use engram_storage::StorageEngine;

fn centroid() -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
    v[0] = 1.0;
    v
}

fn cluster_draft(domain: &str) -> ClusterDraft {
    ClusterDraft {
        theme: "retry-backoff-jitter".to_string(),
        centroid: centroid(),
        member_count: 0,
        avg_confidence: 0.0,
        domain: domain.to_string(),
        status: ClusterStatus::Growing,
    }
}

fn save(engine: &StorageEngine, content: &str, domain: &str) -> i64 {
    let draft = RecordDraft {
        content: content.to_string(),
        structured: None,
        summary: content.to_string(),
        keywords: String::new(),
        tags: Vec::new(),
        memory_type: MemoryType::Pattern,
        domain: domain.to_string(),
        confidence: Confidence::new(0.7),
        source: "user".to_string(),
        content_hash: MemoryRecord::compute_content_hash(content),
        promoted_at: None,
    };
    engine.insert_record(&draft).unwrap()
}

#[test]
fn insert_and_get_round_trip() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = engine.insert_cluster(&cluster_draft("testing")).unwrap();

    let cluster = engine.get_cluster(id).unwrap().unwrap();
    assert_eq!(cluster.theme, "retry-backoff-jitter");
    assert_eq!(cluster.domain, "testing");
    assert_eq!(cluster.status, ClusterStatus::Growing);
    assert_eq!(cluster.centroid.len(), EMBEDDING_DIMENSIONS);
    assert!(cluster.evolved_at.is_none());
}

#[test]
fn patch_updates_counts_and_status() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let id = engine.insert_cluster(&cluster_draft("testing")).unwrap();

    engine
        .update_cluster(
            id,
            &ClusterPatch {
                member_count: Some(5),
                avg_confidence: Some(0.7),
                status: Some(ClusterStatus::Mature),
                ..Default::default()
            },
        )
        .unwrap();

    let cluster = engine.get_cluster(id).unwrap().unwrap();
    assert_eq!(cluster.member_count, 5);
    assert_eq!(cluster.avg_confidence, 0.7);
    assert_eq!(cluster.status, ClusterStatus::Mature);
}

#[test]
fn domain_listing_respects_status_filter_and_id_order() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let a = engine.insert_cluster(&cluster_draft("devops")).unwrap();
    let b = engine.insert_cluster(&cluster_draft("devops")).unwrap();
    let _other = engine.insert_cluster(&cluster_draft("frontend")).unwrap();

    engine
        .update_cluster(
            b,
            &ClusterPatch {
                status: Some(ClusterStatus::Merged),
                ..Default::default()
            },
        )
        .unwrap();

    let open = engine
        .clusters_by_domain("devops", &[ClusterStatus::Growing, ClusterStatus::Mature])
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, a);

    let all = engine
        .clusters_by_domain(
            "devops",
            &[ClusterStatus::Growing, ClusterStatus::Mature, ClusterStatus::Merged],
        )
        .unwrap();
    assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn members_follow_cluster_assignment() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let cluster = engine.insert_cluster(&cluster_draft("devops")).unwrap();
    let m1 = save(&engine, "blue green deploys", "devops");
    let m2 = save(&engine, "canary rollouts", "devops");

    for id in [m1, m2] {
        engine
            .update_fields(
                id,
                &RecordPatch {
                    cluster_id: Some(Some(cluster)),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let members = engine.cluster_members(cluster).unwrap();
    assert_eq!(members.iter().map(|m| m.id).collect::<Vec<_>>(), vec![m1, m2]);
}

#[test]
fn recent_by_type_domain_is_newest_first_and_bounded() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let mut ids = Vec::new();
    for i in 0..15 {
        ids.push(save(&engine, &format!("note {i}"), "devops"));
    }
    save(&engine, "other domain", "frontend");

    let recent = engine
        .recent_by_type_domain(MemoryType::Pattern, "devops", 10)
        .unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].id, *ids.last().unwrap());
    for pair in recent.windows(2) {
        assert!(pair[0].id > pair[1].id);
    }
}

#[test]
fn unclustered_query_filters_and_orders_by_confidence() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let low = save(&engine, "low confidence", "devops");
    let high = save(&engine, "high confidence", "devops");
    engine
        .update_fields(
            high,
            &RecordPatch {
                confidence: Some(Confidence::new(0.9)),
                ..Default::default()
            },
        )
        .unwrap();
    engine
        .update_fields(
            low,
            &RecordPatch {
                confidence: Some(Confidence::new(0.3)),
                ..Default::default()
            },
        )
        .unwrap();

    let unclustered = engine.unclustered_memories(0.5, None, 100).unwrap();
    assert_eq!(unclustered.len(), 1);
    assert_eq!(unclustered[0].id, high);
}

#[test]
fn stats_aggregate_types_domains_and_clusters() {
    let engine = StorageEngine::open_in_memory().unwrap();
    save(&engine, "one", "devops");
    save(&engine, "two", "devops");
    engine.insert_cluster(&cluster_draft("devops")).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_memories, 2);
    assert_eq!(stats.by_type.get("pattern"), Some(&2));
    assert_eq!(stats.by_domain.get("devops"), Some(&2));
    assert_eq!(stats.clusters_by_status.get("growing"), Some(&1));
    assert_eq!(stats.promoted_count, 0);
}
