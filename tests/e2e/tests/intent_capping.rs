//! End-to-end scenario: a minimal-intent query caps factual retrieval to
//! one row per its listed categories even with a larger active pool (spec
//! section 8, end-to-end scenario 4).

use chrono::Utc;

use engram_core::embeddings::HashingEmbedder;
use engram_core::memory::{ConfidenceSource, Memory, MemoryKind, MemoryStatus};
use engram_core::retrieval::{retrieve_factual, Intent};
use engram_core::{EmbeddingProvider, Storage};

fn factual(user_id: &str, category: &str, topic: &str, fact: &str, embedder: &HashingEmbedder) -> Memory {
    let now = Utc::now();
    Memory {
        memory_id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        memory_kind: MemoryKind::Factual,
        category: category.to_string(),
        topic: topic.to_string(),
        fact: fact.to_string(),
        importance: 5.0,
        confidence_score: 0.9,
        confidence_source: ConfidenceSource::Implicit,
        frequency: 1,
        evidence_count: 1,
        status: MemoryStatus::Active,
        embedding: Some(embedder.embed(fact).expect("embed")),
        metadata: serde_json::json!({}),
        expires_at: None,
        created_at: now,
        last_updated: now,
        last_accessed: None,
    }
}

#[test]
fn ten_active_memories_across_categories_cap_to_two_under_minimal_intent() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");
    let embedder = HashingEmbedder::default();

    for i in 0..6 {
        storage
            .insert_memory(&factual("u1", "technical_context", &format!("topic{i}"), &format!("User fact number {i} about stack"), &embedder))
            .expect("insert technical_context");
    }
    for i in 0..2 {
        storage
            .insert_memory(&factual("u1", "constraint", &format!("rule{i}"), &format!("Constraint number {i} about stack"), &embedder))
            .expect("insert constraint");
    }
    for i in 0..2 {
        storage
            .insert_memory(&factual("u1", "problem_domain", &format!("domain{i}"), &format!("Domain fact {i} about stack"), &embedder))
            .expect("insert problem_domain");
    }

    let active = storage.list_active_factual("u1").expect("list active");
    assert_eq!(active.len(), 10);

    let chunks = vec!["User fact about stack and constraint rule".to_string()];
    let results = retrieve_factual(&storage, &embedder, "u1", &chunks, &[], Intent::Minimal).expect("retrieve");

    assert!(results.len() <= 2, "minimal intent should cap to at most 2 rows, got {}", results.len());
    let technical_count = results.iter().filter(|m| m.category == "technical_context").count();
    let constraint_count = results.iter().filter(|m| m.category == "constraint").count();
    assert!(technical_count <= 1);
    assert!(constraint_count <= 1);
}
