//! End-to-end scenario: two near-duplicate factual rows collapse into one
//! canonical active row during L1 consolidation (spec section 8, end-to-end
//! scenario 5).

use chrono::Utc;

use engram_core::consolidation::consolidate;
use engram_core::memory::{ConfidenceSource, Memory, MemoryKind, MemoryStatus};
use engram_core::Storage;

fn factual_with_embedding(category: &str, embedding: Vec<f32>, evidence_count: i64) -> Memory {
    let now = Utc::now();
    Memory {
        memory_id: uuid::Uuid::new_v4().to_string(),
        user_id: "u1".to_string(),
        memory_kind: MemoryKind::Factual,
        category: category.to_string(),
        topic: "language".to_string(),
        fact: "User prefers Rust for systems programming".to_string(),
        importance: 4.0,
        confidence_score: 0.9,
        confidence_source: ConfidenceSource::Implicit,
        frequency: 1,
        evidence_count,
        status: MemoryStatus::Active,
        embedding: Some(embedding),
        metadata: serde_json::json!({}),
        expires_at: None,
        created_at: now,
        last_updated: now,
        last_accessed: None,
    }
}

#[test]
fn near_duplicate_pair_merges_to_one_active_row_with_bumped_evidence() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");

    // Cosine similarity between these two vectors is ~0.9987 (well above the
    // 0.95 scenario floor and the L1 threshold).
    let first = factual_with_embedding("technical_context", vec![1.0, 0.05, 0.0], 1);
    let second = factual_with_embedding("technical_context", vec![0.99, 0.1, 0.0], 2);
    storage.insert_memory(&first).expect("insert first");
    storage.insert_memory(&second).expect("insert second");

    let result = consolidate(&storage, "u1").expect("consolidate");
    assert_eq!(result.merged, 1);

    let active = storage.list_active_factual("u1").expect("list active");
    assert_eq!(active.len(), 1);

    let canonical = &active[0];
    // `second` has more evidence, so it wins as canonical.
    assert_eq!(canonical.memory_id, second.memory_id);
    assert_eq!(canonical.evidence_count, 3);

    let merged_row = storage.get_memory(&first.memory_id).expect("get").expect("present");
    assert_eq!(merged_row.status, MemoryStatus::Merged);
}
